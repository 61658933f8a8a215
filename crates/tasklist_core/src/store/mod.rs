//! Task store and its observer contract.
//!
//! # Responsibility
//! - Hold the single source of truth for the session's task list.
//! - Expose mutation/query operations to presentation layers.
//! - Publish state-change events to subscribers.
//!
//! # Invariants
//! - Presentation layers never hold their own copy of the list as truth.
//! - Tasks are addressed by stable id only, never by list position.

pub mod observer;
pub mod task_store;
