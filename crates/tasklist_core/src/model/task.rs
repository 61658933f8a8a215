//! Task domain model.
//!
//! # Responsibility
//! - Define the to-do record held by the store and written to storage.
//! - Validate records on construction and on deserialization.
//!
//! # Invariants
//! - `id` is a random v4 UUID, never nil and never reused.
//! - `title` is stored trimmed and is never empty.
//! - `id`, `title` and `due_date` are fixed once the task exists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one task.
///
/// Identity is generated once and never derived from list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one restored from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses the canonical hyphenated string form.
    pub fn parse_str(value: &str) -> Result<Self, TaskValidationError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| TaskValidationError::MalformedId(value.to_string()))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Identifier is the nil UUID.
    NilId,
    /// Identifier text is not a UUID.
    MalformedId(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::NilId => write!(f, "task id must not be nil"),
            Self::MalformedId(value) => write!(f, "malformed task id `{value}`"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
///
/// Serialized with camelCase field names (`id`, `title`, `isCompleted`,
/// `dueDate`). Unknown fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub is_completed: bool,
    /// `None` means the task has no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a pending task with a generated id.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank.
    pub fn new(
        title: impl AsRef<str>,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(TaskId::new(), title, due_date)
    }

    /// Creates a pending task with a caller-provided id.
    pub fn with_id(
        id: TaskId,
        title: impl AsRef<str>,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: normalize_title(title.as_ref())?,
            is_completed: false,
            due_date,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record invariants. Used on every path that admits a task.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Flips the completion flag. The only in-place mutation a task allows.
    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }
}

/// Trims `raw` and rejects blank titles.
pub fn normalize_title(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

// Wire shape used for deserialization so restored records pass `validate()`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    due_date: Option<NaiveDate>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskRecord) -> Result<Self, Self::Error> {
        let task = Task {
            id: value.id,
            title: value.title,
            is_completed: value.is_completed,
            due_date: value.due_date,
        };
        task.validate()?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Task, TaskId, TaskValidationError};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn new_task_is_pending_with_trimmed_title() {
        let task = Task::new("  Buy milk \n", None).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.is_completed);
        assert!(!task.id.is_nil());
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn new_task_rejects_blank_title() {
        assert_eq!(
            Task::new("", None).unwrap_err(),
            TaskValidationError::EmptyTitle
        );
        assert_eq!(
            Task::new(" \t ", None).unwrap_err(),
            TaskValidationError::EmptyTitle
        );
    }

    #[test]
    fn with_id_rejects_nil_id() {
        let err = Task::with_id(TaskId::from_uuid(Uuid::nil()), "x", None).unwrap_err();
        assert_eq!(err, TaskValidationError::NilId);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(TaskId::new(), TaskId::new());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut task = Task::new("Write report", None).unwrap();
        task.toggle();
        assert!(task.is_completed);
        task.toggle();
        assert!(!task.is_completed);
    }

    #[test]
    fn parse_str_accepts_display_output_and_rejects_garbage() {
        let id = TaskId::new();
        assert_eq!(TaskId::parse_str(&id.to_string()).unwrap(), id);
        assert!(matches!(
            TaskId::parse_str("not-an-id"),
            Err(TaskValidationError::MalformedId(_))
        ));
    }

    #[test]
    fn serialization_uses_camel_case_and_iso_dates() {
        let id = TaskId::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        let mut task =
            Task::with_id(id, "Ship it", NaiveDate::from_ymd_opt(2026, 2, 19)).unwrap();
        task.toggle();

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
        assert_eq!(json["title"], "Ship it");
        assert_eq!(json["isCompleted"], true);
        assert_eq!(json["dueDate"], "2026-02-19");
    }

    #[test]
    fn deserialization_ignores_unknown_fields_and_defaults_missing_ones() {
        let value = serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "title": "Call mom",
            "priority": "high"
        });
        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.title, "Call mom");
        assert!(!task.is_completed);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn deserialization_rejects_blank_title() {
        let value = serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "title": "   ",
            "isCompleted": false
        });
        let err = serde_json::from_value::<Task>(value).unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "{err}");
    }

    #[test]
    fn normalize_title_trims() {
        assert_eq!(normalize_title(" a b ").unwrap(), "a b");
    }
}
