//! State-change notification contract.
//!
//! # Responsibility
//! - Let any number of presentation components subscribe to store changes.
//! - Deliver one event per successful mutation, after the mutation is visible.
//!
//! # Invariants
//! - Observers are called without any store lock held.
//! - Delivery order follows subscription order.

use crate::model::task::TaskId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// What changed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    TaskAdded { id: TaskId, revision: u64 },
    TaskToggled { id: TaskId, is_completed: bool, revision: u64 },
    TaskDeleted { id: TaskId, revision: u64 },
}

impl StoreEvent {
    /// Store revision right after the mutation.
    pub fn revision(&self) -> u64 {
        match self {
            Self::TaskAdded { revision, .. }
            | Self::TaskToggled { revision, .. }
            | Self::TaskDeleted { revision, .. } => *revision,
        }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            Self::TaskAdded { id, .. }
            | Self::TaskToggled { id, .. }
            | Self::TaskDeleted { id, .. } => *id,
        }
    }

    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TaskAdded { .. } => "task_add",
            Self::TaskToggled { .. } => "task_toggle",
            Self::TaskDeleted { .. } => "task_delete",
        }
    }
}

/// Receiver of store change notifications.
pub trait StoreObserver: Send + Sync {
    fn on_state_changed(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn on_state_changed(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: AtomicU64,
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn StoreObserver>)>>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&self, observer: Arc<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `event` to a snapshot of current observers.
    ///
    /// The registry lock is released before callbacks run, so observers may
    /// subscribe or unsubscribe from inside a callback.
    pub(crate) fn notify(&self, event: &StoreEvent) {
        let snapshot: Vec<Arc<dyn StoreObserver>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in snapshot {
            observer.on_state_changed(event);
        }
    }
}
