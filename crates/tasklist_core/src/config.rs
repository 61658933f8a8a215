//! Store configuration.
//!
//! # Responsibility
//! - Hold tunables that callers pass when opening a `TaskStore`.
//! - Parse JSON config documents with defaults for every field.
//!
//! # Invariants
//! - A missing or partial config document always yields a usable config.
//! - Unknown keys are ignored.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// How `add_task` fills the due date when the caller omits one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDatePolicy {
    /// Stamp the local calendar date at creation time.
    #[default]
    Today,
    /// Leave the task without a deadline.
    NoDate,
}

impl DueDatePolicy {
    /// Resolves the effective due date for a new task.
    pub fn resolve(self, explicit: Option<NaiveDate>) -> Option<NaiveDate> {
        match (explicit, self) {
            (Some(date), _) => Some(date),
            (None, Self::Today) => Some(Local::now().date_naive()),
            (None, Self::NoDate) => None,
        }
    }
}

/// Task inserted on a fresh start, before anything was ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedTask {
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Options for opening a `TaskStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub due_date_policy: DueDatePolicy,
    /// Key of the persisted blob in key-value storage.
    pub storage_key: String,
    pub seed_tasks: Vec<SeedTask>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            due_date_policy: DueDatePolicy::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed_tasks: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Parses a JSON config document.
    ///
    /// A blank `storage_key` falls back to the default key.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(raw)?;
        if config.storage_key.trim().is_empty() {
            config.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{DueDatePolicy, StoreConfig, DEFAULT_STORAGE_KEY};
    use chrono::NaiveDate;

    #[test]
    fn empty_document_yields_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.due_date_policy, DueDatePolicy::Today);
    }

    #[test]
    fn parses_policy_and_seed_tasks_ignoring_unknown_keys() {
        let config = StoreConfig::from_json_str(
            r#"{
                "due_date_policy": "no_date",
                "storage_key": "inbox",
                "theme": "dark",
                "seed_tasks": [
                    {"title": "Explore features"},
                    {"title": "Design UI", "isCompleted": true, "dueDate": "2026-02-19"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.due_date_policy, DueDatePolicy::NoDate);
        assert_eq!(config.storage_key, "inbox");
        assert_eq!(config.seed_tasks.len(), 2);
        assert!(!config.seed_tasks[0].is_completed);
        assert!(config.seed_tasks[1].is_completed);
        assert_eq!(
            config.seed_tasks[1].due_date,
            NaiveDate::from_ymd_opt(2026, 2, 19)
        );
    }

    #[test]
    fn blank_storage_key_falls_back_to_default() {
        let config = StoreConfig::from_json_str(r#"{"storage_key": "  "}"#).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn explicit_due_date_wins_over_policy() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert_eq!(DueDatePolicy::NoDate.resolve(date), date);
        assert_eq!(DueDatePolicy::Today.resolve(date), date);
        assert_eq!(DueDatePolicy::NoDate.resolve(None), None);
        assert!(DueDatePolicy::Today.resolve(None).is_some());
    }
}
