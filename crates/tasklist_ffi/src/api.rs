//! FFI use-case API for the mobile presentation layer.
//!
//! # Responsibility
//! - Expose task list use-cases to Dart via FRB.
//! - Own the one process-wide `TaskStore` the UI talks to.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Ids and dates cross the boundary as strings (`uuid`, `YYYY-MM-DD`).

use chrono::NaiveDate;
use log::warn;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, LoadStatus,
    SqliteKvAdapter, StoreConfig, Task, TaskId, TaskStore,
};

const DB_FILE_NAME: &str = "tasklist.sqlite3";
const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
static STORE: OnceLock<TaskStore> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
///
/// # FFI contract
/// - Sync call; may create the log directory and first log file.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - A different level or directory after the first call returns an error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub title: String,
    pub is_completed: bool,
    /// `YYYY-MM-DD`, or `None` when the task has no deadline.
    pub due_date: Option<String>,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.id.to_string(),
            title: task.title,
            is_completed: task.is_completed,
            due_date: task.due_date.map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Result envelope for add/toggle/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Affected task after the action; `None` on failure and for deletes.
    pub task: Option<TaskItem>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Result envelope for list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    /// Store revision the items were read at.
    pub revision: u64,
    pub message: String,
}

/// Progress card values.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProgressResponse {
    pub completed_count: u32,
    pub pending_count: u32,
    pub total_count: u32,
    pub ratio: f64,
    pub percent: u8,
}

/// Adds a task. `due_date` is `YYYY-MM-DD`; omitted means store default.
///
/// # FFI contract
/// - Sync call, DB-backed execution (write-through before returning).
/// - Never panics.
/// - Returns the created task on success; blank titles and malformed dates
///   fail without touching the store.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_add(title: String, due_date: Option<String>) -> TaskActionResponse {
    let due_date = match due_date.as_deref().map(parse_due_date).transpose() {
        Ok(date) => date,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match store().add_task(&title, due_date) {
        Ok(task) => TaskActionResponse::success("Task added.", Some(task.into())),
        Err(err) => TaskActionResponse::failure(format!("tasks_add failed: {err}")),
    }
}

/// Flips completion of one task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the updated task, or `ok=false` for malformed or unknown ids.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_toggle(task_id: String) -> TaskActionResponse {
    let id = match TaskId::parse_str(&task_id) {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(format!("tasks_toggle failed: {err}")),
    };
    match store().toggle_completion(id) {
        Ok(task) => TaskActionResponse::success("Task updated.", Some(task.into())),
        Err(err) => TaskActionResponse::failure(format!("tasks_toggle failed: {err}")),
    }
}

/// Deletes one task by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Deleting an id twice fails the second time with a `not found` message.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(task_id: String) -> TaskActionResponse {
    let id = match TaskId::parse_str(&task_id) {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(format!("tasks_delete failed: {err}")),
    };
    match store().delete_task(id) {
        Ok(()) => TaskActionResponse::success("Task deleted.", None),
        Err(err) => TaskActionResponse::failure(format!("tasks_delete failed: {err}")),
    }
}

/// Lists tasks; `filter` is `all|pending|completed` (default `all`).
///
/// # FFI contract
/// - Sync call; reads in-memory state only (the first call of the process
///   opens the store).
/// - Never panics.
/// - Returns items in insertion order with the revision they were read at.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(filter: Option<String>) -> TaskListResponse {
    let completed = match filter.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some("pending") => Some(false),
        Some("completed") => Some(true),
        Some(other) => {
            return TaskListResponse {
                ok: false,
                items: Vec::new(),
                revision: store().revision(),
                message: format!("unknown filter `{other}`; expected all|pending|completed"),
            }
        }
    };

    let snapshot = store().snapshot();
    let items = snapshot
        .tasks
        .into_iter()
        .filter(|task| completed.map_or(true, |wanted| task.is_completed == wanted))
        .map(TaskItem::from)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No tasks.".to_string()
    } else {
        format!("{} task(s).", items.len())
    };
    TaskListResponse {
        ok: true,
        items,
        revision: snapshot.revision,
        message,
    }
}

/// Completed/pending/total counters for the statistics card.
///
/// # FFI contract
/// - Sync call, in-memory read.
/// - Never panics; counters above `u32::MAX` saturate.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_progress() -> TaskProgressResponse {
    let progress = store().progress();
    TaskProgressResponse {
        completed_count: saturating_u32(progress.completed_count),
        pending_count: saturating_u32(progress.pending_count()),
        total_count: saturating_u32(progress.total_count),
        ratio: progress.ratio,
        percent: progress.percent(),
    }
}

/// Revision counter; the UI re-reads lists when it changes.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_revision() -> u64 {
    store().revision()
}

fn store() -> &'static TaskStore {
    STORE.get_or_init(open_store)
}

fn open_store() -> TaskStore {
    let config = StoreConfig::default();
    let db_path = resolve_db_path();
    match SqliteKvAdapter::open(&db_path, config.storage_key.clone()) {
        Ok(adapter) => {
            let store = TaskStore::open(config, Arc::new(adapter));
            match store.load_status() {
                LoadStatus::Recovered { reason } => {
                    warn!("event=ffi_store_open module=ffi status=degraded reason={reason}");
                }
                LoadStatus::Incompatible { reason } => {
                    warn!("event=ffi_store_open module=ffi status=read_only reason={reason}");
                }
                _ => {}
            }
            store
        }
        Err(err) => {
            warn!(
                "event=ffi_store_open module=ffi status=ephemeral path={} error={err}",
                db_path.display()
            );
            TaskStore::new(config)
        }
    }
}

fn resolve_db_path() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => std::env::temp_dir().join(DB_FILE_NAME),
    }
}

fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid due date `{raw}`: {err}"))
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
