//! Core logic for the task list app.
//! This crate is the single source of truth for task state and its invariants;
//! presentation layers only read snapshots and forward user intents.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod store;

pub use config::{DueDatePolicy, SeedTask, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::progress::Progress;
pub use model::task::{Task, TaskId, TaskValidationError};
pub use persist::codec::{decode_tasks, encode_tasks, CodecError, SCHEMA_VERSION};
pub use persist::memory::MemoryAdapter;
pub use persist::sqlite_kv::SqliteKvAdapter;
pub use persist::{PersistError, PersistResult, PersistenceAdapter};
pub use store::observer::{StoreEvent, StoreObserver, SubscriptionId};
pub use store::task_store::{LoadStatus, StoreError, StoreResult, StoreSnapshot, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
