//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical task record consumed by store and persistence.
//! - Provide derived read-only projections (progress statistics).
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - Only the completion flag changes after a task is created.

pub mod progress;
pub mod task;
