//! Completion statistics over a task list.

use crate::model::task::Task;
use serde::Serialize;

/// Completed/total counters with a division-safe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_count: usize,
    pub total_count: usize,
    /// `completed_count / total_count`, or `0.0` for an empty list.
    pub ratio: f64,
}

impl Progress {
    /// Computes statistics in one pass over `tasks`.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed_count = tasks.iter().filter(|task| task.is_completed).count();
        Self::from_counts(completed_count, tasks.len())
    }

    /// Builds statistics from raw counters; `completed_count` is capped at
    /// `total_count`.
    pub fn from_counts(completed_count: usize, total_count: usize) -> Self {
        let completed_count = completed_count.min(total_count);
        let ratio = if total_count > 0 {
            completed_count as f64 / total_count as f64
        } else {
            0.0
        };
        Self {
            completed_count,
            total_count,
            ratio,
        }
    }

    pub fn empty() -> Self {
        Self::from_counts(0, 0)
    }

    pub fn pending_count(&self) -> usize {
        self.total_count.saturating_sub(self.completed_count)
    }

    /// Whole-number percentage, truncated toward zero.
    pub fn percent(&self) -> u8 {
        (self.ratio * 100.0) as u8
    }
}
