//! SQLite key-value persistence adapter.
//!
//! # Responsibility
//! - Store the serialized task list as one blob under a configured key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` is an upsert; the previous blob is replaced atomically.
//! - A missing row loads as `None`, not as an error.

use crate::db::{open_db, open_db_in_memory};
use crate::persist::{PersistError, PersistResult, PersistenceAdapter};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Key-value adapter over a migrated SQLite connection.
pub struct SqliteKvAdapter {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteKvAdapter {
    /// Wraps an already-migrated connection.
    ///
    /// # Errors
    /// - `Unavailable` when `key` is blank.
    pub fn new(conn: Connection, key: impl Into<String>) -> PersistResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(PersistError::Unavailable(
                "storage key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            conn: Mutex::new(conn),
            key,
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> PersistResult<Self> {
        Self::new(open_db(path)?, key)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(key: impl Into<String>) -> PersistResult<Self> {
        Self::new(open_db_in_memory()?, key)
    }

    /// Key the blob is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Removes the stored blob. Returns whether a row existed.
    pub fn clear(&self) -> PersistResult<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [&self.key])?;
        Ok(changed > 0)
    }
}

impl PersistenceAdapter for SqliteKvAdapter {
    fn save(&self, bytes: &[u8]) -> PersistResult<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), bytes],
        )?;
        Ok(())
    }

    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [&self.key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }
}
