//! Persistence boundary for the task store.
//!
//! # Responsibility
//! - Define the byte-level save/load contract the store writes through.
//! - Provide the wire codec and the bundled adapter implementations.
//!
//! # Invariants
//! - Adapters deal in opaque bytes; only `codec` knows the task layout.
//! - Adapter failures are reported, never escalated to panics.

pub mod codec;
pub mod memory;
pub mod sqlite_kv;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure reported by a persistence adapter.
#[derive(Debug)]
pub enum PersistError {
    Sqlite(rusqlite::Error),
    /// The database file was migrated by a newer build; it is left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Adapter-specific failure without a richer source.
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "task database failed: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "task database was written by a newer build (schema {db_version}, this build reads up to {latest_supported})"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Durable byte storage for the serialized task list.
pub trait PersistenceAdapter: Send + Sync {
    /// Replaces the stored blob.
    fn save(&self, bytes: &[u8]) -> PersistResult<()>;

    /// Reads the stored blob; `Ok(None)` when nothing was saved yet.
    fn load(&self) -> PersistResult<Option<Vec<u8>>>;
}
