//! Authoritative in-memory task list.
//!
//! # Responsibility
//! - Own the ordered task sequence and every mutation/query on it.
//! - Notify observers and write through to persistence after each mutation.
//! - Restore state at open without ever failing on bad storage.
//!
//! # Invariants
//! - Task ids are unique within the store.
//! - Insertion order is preserved; deletion never reorders survivors.
//! - Each mutation is applied fully under the write lock or not at all.
//! - Persistence failures never roll back or block in-memory state.
//! - Storage never receives an older snapshot after a newer one.
//! - A blob written by a newer, unreadable schema is never overwritten.

use crate::config::StoreConfig;
use crate::model::progress::Progress;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::persist::codec::{decode_tasks, encode_tasks, CodecError};
use crate::persist::{PersistError, PersistResult, PersistenceAdapter};
use crate::store::observer::{ObserverRegistry, StoreEvent, StoreObserver, SubscriptionId};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

const SAVES_REFUSED_MESSAGE: &str =
    "storage holds a newer task list schema; changes are kept in memory only";

/// Caller-recoverable store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Input rejected before touching state (e.g. blank title).
    InvalidInput(String),
    /// No task with this id is held by the store.
    NotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

/// How the store obtained its initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No persistence adapter configured.
    Ephemeral,
    /// Adapter had nothing stored yet.
    Fresh,
    /// State decoded from storage.
    Restored { count: usize },
    /// Storage was unreadable or corrupt; started empty.
    Recovered { reason: String },
    /// Storage holds a newer schema this build cannot read; started empty
    /// and saves are refused so the stored list survives.
    Incompatible { reason: String },
}

impl LoadStatus {
    /// Whether saves may replace what storage currently holds.
    pub fn allows_saves(&self) -> bool {
        !matches!(self, Self::Incompatible { .. })
    }
}

/// Tasks and revision read under one lock acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub revision: u64,
    pub tasks: Vec<Task>,
    pub progress: Progress,
}

struct StoreState {
    tasks: Vec<Task>,
    revision: u64,
}

#[derive(Default)]
struct PersistGate {
    persisted_revision: Option<u64>,
    last_error: Option<String>,
}

/// Single source of truth for the task list.
///
/// Writers are serialized by one exclusive lock; readers share it and
/// always see a complete state.
pub struct TaskStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    observers: ObserverRegistry,
    persist_gate: Mutex<PersistGate>,
    load_status: LoadStatus,
}

impl TaskStore {
    /// Creates an empty store without persistence.
    pub fn new(config: StoreConfig) -> Self {
        Self::from_parts(config, Vec::new(), None, LoadStatus::Ephemeral)
    }

    /// Creates a store restored from `adapter`.
    ///
    /// Never fails: unreadable or corrupt storage is logged, reported via
    /// `load_status()`, and the store starts empty. Configured seed tasks are
    /// inserted only when storage held nothing.
    pub fn open(config: StoreConfig, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let started_at = Instant::now();
        let (tasks, load_status) = restore(adapter.as_ref());
        match &load_status {
            LoadStatus::Recovered { reason } => warn!(
                "event=store_open module=store status=degraded duration_ms={} reason={}",
                started_at.elapsed().as_millis(),
                reason
            ),
            LoadStatus::Incompatible { reason } => warn!(
                "event=store_open module=store status=read_only duration_ms={} reason={}",
                started_at.elapsed().as_millis(),
                reason
            ),
            _ => info!(
                "event=store_open module=store status=ok duration_ms={} task_count={}",
                started_at.elapsed().as_millis(),
                tasks.len()
            ),
        }

        let should_seed = load_status == LoadStatus::Fresh && !config.seed_tasks.is_empty();
        let store = Self::from_parts(config, tasks, Some(adapter), load_status);
        if should_seed {
            store.apply_seed();
        }
        store
    }

    fn from_parts(
        config: StoreConfig,
        tasks: Vec<Task>,
        adapter: Option<Arc<dyn PersistenceAdapter>>,
        load_status: LoadStatus,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState { tasks, revision: 0 }),
            adapter,
            observers: ObserverRegistry::default(),
            persist_gate: Mutex::new(PersistGate::default()),
            load_status,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Appends a new pending task.
    ///
    /// A missing `due_date` is filled according to the configured policy.
    ///
    /// # Errors
    /// - `InvalidInput` when `title` is blank; the store is unchanged.
    pub fn add_task(&self, title: &str, due_date: Option<NaiveDate>) -> StoreResult<Task> {
        let mut task = Task::new(title, self.config.due_date_policy.resolve(due_date))?;

        let (event, pending_save) = {
            let mut state = self.write_state();
            while state.tasks.iter().any(|existing| existing.id == task.id) {
                task.id = TaskId::new();
            }
            state.tasks.push(task.clone());
            state.revision += 1;
            let event = StoreEvent::TaskAdded {
                id: task.id,
                revision: state.revision,
            };
            (event, self.encode_for_save(&state))
        };

        self.after_mutation(&event, pending_save);
        Ok(task)
    }

    /// Flips the completion flag of task `id` and returns the updated task.
    ///
    /// # Errors
    /// - `NotFound` when no task has `id`; the store is unchanged.
    pub fn toggle_completion(&self, id: TaskId) -> StoreResult<Task> {
        let (updated, event, pending_save) = {
            let mut state = self.write_state();
            let task = state
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or(StoreError::NotFound(id))?;
            task.toggle();
            let updated = task.clone();
            state.revision += 1;
            let event = StoreEvent::TaskToggled {
                id,
                is_completed: updated.is_completed,
                revision: state.revision,
            };
            (updated, event, self.encode_for_save(&state))
        };

        self.after_mutation(&event, pending_save);
        Ok(updated)
    }

    /// Removes task `id`, keeping the order of the rest.
    ///
    /// # Errors
    /// - `NotFound` when no task has `id`. Deleting twice is an error, not a
    ///   no-op; the store is unchanged and nothing is notified or saved.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let (event, pending_save) = {
            let mut state = self.write_state();
            let index = state
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or(StoreError::NotFound(id))?;
            state.tasks.remove(index);
            state.revision += 1;
            let event = StoreEvent::TaskDeleted {
                id,
                revision: state.revision,
            };
            (event, self.encode_for_save(&state))
        };

        self.after_mutation(&event, pending_save);
        Ok(())
    }

    /// Ordered copy of every task.
    pub fn list_all(&self) -> Vec<Task> {
        self.read_state().tasks.clone()
    }

    /// Ordered copy of tasks whose completion flag equals `completed`.
    pub fn list_by_completion(&self, completed: bool) -> Vec<Task> {
        self.read_state()
            .tasks
            .iter()
            .filter(|task| task.is_completed == completed)
            .cloned()
            .collect()
    }

    pub fn progress(&self) -> Progress {
        Progress::from_tasks(&self.read_state().tasks)
    }

    /// Linear lookup by id.
    pub fn get_task(&self, id: TaskId) -> Option<Task> {
        self.read_state()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read_state().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().tasks.is_empty()
    }

    /// Counter bumped once per successful mutation.
    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    /// Tasks, progress and revision from the same state.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read_state();
        StoreSnapshot {
            revision: state.revision,
            progress: Progress::from_tasks(&state.tasks),
            tasks: state.tasks.clone(),
        }
    }

    /// Registers an observer called after every successful mutation.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Message of the most recent failed write-through, cleared on success.
    pub fn last_save_error(&self) -> Option<String> {
        self.lock_gate().last_error.clone()
    }

    /// Saves the current state synchronously and reports the outcome.
    ///
    /// Intended for session end. Without an adapter this is a no-op, and it
    /// does not save again when storage already holds the current revision.
    ///
    /// # Errors
    /// - `Unavailable` when storage holds an incompatible newer schema.
    /// - Whatever the adapter reports for a failed save.
    pub fn persist_now(&self) -> PersistResult<()> {
        let Some(adapter) = &self.adapter else {
            return Ok(());
        };
        if !self.load_status.allows_saves() {
            return Err(PersistError::Unavailable(
                SAVES_REFUSED_MESSAGE.to_string(),
            ));
        }

        // Gate before state: a writer that commits after this read queues
        // behind us and saves its newer revision afterwards.
        let mut gate = self.lock_gate();
        let (revision, bytes) = {
            let state = self.read_state();
            if gate.persisted_revision.is_some_and(|saved| saved >= state.revision) {
                return Ok(());
            }
            let bytes = encode_tasks(&state.tasks)
                .map_err(|err| PersistError::Unavailable(err.to_string()))?;
            (state.revision, bytes)
        };

        match adapter.save(&bytes) {
            Ok(()) => {
                gate.persisted_revision = Some(revision);
                gate.last_error = None;
                Ok(())
            }
            Err(err) => {
                gate.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn apply_seed(&self) {
        let pending_save = {
            let mut state = self.write_state();
            for seed in &self.config.seed_tasks {
                match Task::new(&seed.title, seed.due_date) {
                    Ok(mut task) => {
                        task.is_completed = seed.is_completed;
                        state.tasks.push(task);
                    }
                    Err(err) => {
                        warn!("event=store_seed module=store status=skipped error={err}");
                    }
                }
            }
            info!(
                "event=store_seed module=store status=ok task_count={}",
                state.tasks.len()
            );
            self.encode_for_save(&state)
        };
        if let Some((revision, bytes)) = pending_save {
            self.write_through(revision, &bytes);
        }
    }

    fn encode_for_save(&self, state: &StoreState) -> Option<(u64, Vec<u8>)> {
        self.adapter.as_ref()?;
        match encode_tasks(&state.tasks) {
            Ok(bytes) => Some((state.revision, bytes)),
            Err(err) => {
                warn!(
                    "event=store_persist module=store status=error revision={} error={err}",
                    state.revision
                );
                None
            }
        }
    }

    fn after_mutation(&self, event: &StoreEvent, pending_save: Option<(u64, Vec<u8>)>) {
        info!(
            "event={} module=store status=ok task_id={} revision={}",
            event.label(),
            event.task_id(),
            event.revision()
        );
        if let Some((revision, bytes)) = pending_save {
            self.write_through(revision, &bytes);
        }
        self.observers.notify(event);
    }

    fn write_through(&self, revision: u64, bytes: &[u8]) {
        let Some(adapter) = &self.adapter else {
            return;
        };
        let mut gate = self.lock_gate();
        if !self.load_status.allows_saves() {
            warn!("event=store_persist module=store status=refused revision={revision}");
            gate.last_error = Some(SAVES_REFUSED_MESSAGE.to_string());
            return;
        }
        if gate.persisted_revision.is_some_and(|saved| saved >= revision) {
            debug!("event=store_persist module=store status=skipped revision={revision}");
            return;
        }

        match adapter.save(bytes) {
            Ok(()) => {
                gate.persisted_revision = Some(revision);
                gate.last_error = None;
                debug!(
                    "event=store_persist module=store status=ok revision={revision} bytes={}",
                    bytes.len()
                );
            }
            Err(err) => {
                warn!("event=store_persist module=store status=error revision={revision} error={err}");
                gate.last_error = Some(err.to_string());
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_gate(&self) -> MutexGuard<'_, PersistGate> {
        self.persist_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn restore(adapter: &dyn PersistenceAdapter) -> (Vec<Task>, LoadStatus) {
    let bytes = match adapter.load() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return (Vec::new(), LoadStatus::Fresh),
        Err(err) => {
            return (
                Vec::new(),
                LoadStatus::Recovered {
                    reason: err.to_string(),
                },
            )
        }
    };

    match decode_tasks(&bytes) {
        Ok(tasks) => {
            let count = tasks.len();
            (tasks, LoadStatus::Restored { count })
        }
        Err(err @ CodecError::UnsupportedSchemaVersion { .. }) => (
            Vec::new(),
            LoadStatus::Incompatible {
                reason: err.to_string(),
            },
        ),
        Err(err) => (
            Vec::new(),
            LoadStatus::Recovered {
                reason: err.to_string(),
            },
        ),
    }
}
