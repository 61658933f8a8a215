//! In-memory persistence adapter.
//!
//! Used for ephemeral sessions and tests. Can be pre-seeded with bytes and
//! switched into a failing mode to exercise degraded storage paths.

use crate::persist::{PersistError, PersistResult, PersistenceAdapter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Byte blob held in process memory.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    blob: Mutex<Option<Vec<u8>>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter that already holds `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let adapter = Self::default();
        *adapter.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.into());
        adapter
    }

    /// Current blob, if any.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn save(&self, bytes: &[u8]) -> PersistResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("memory save disabled".to_string()));
        }
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("memory load disabled".to_string()));
        }
        Ok(self.bytes())
    }
}
