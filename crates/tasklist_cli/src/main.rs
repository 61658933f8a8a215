//! CLI smoke probe.
//!
//! Opens a task store (SQLite file when a path is given, memory otherwise)
//! and prints its load status, progress and tasks. Adds, toggles and
//! deletes nothing, but opening a path creates and migrates the database
//! file when needed.

use std::process::ExitCode;
use std::sync::Arc;
use tasklist_core::{core_version, LoadStatus, SqliteKvAdapter, StoreConfig, TaskStore};

fn main() -> ExitCode {
    println!("tasklist_core version={}", core_version());

    let config = StoreConfig::default();
    let adapter = match std::env::args().nth(1) {
        Some(path) => SqliteKvAdapter::open(&path, config.storage_key.clone()),
        None => SqliteKvAdapter::open_in_memory(config.storage_key.clone()),
    };
    let adapter = match adapter {
        Ok(adapter) => adapter,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("storage_key={}", adapter.key());

    let store = TaskStore::open(config, Arc::new(adapter));
    match store.load_status() {
        LoadStatus::Recovered { reason } => println!("load=recovered reason={reason}"),
        LoadStatus::Incompatible { reason } => println!("load=read_only reason={reason}"),
        LoadStatus::Restored { count } => println!("load=restored count={count}"),
        LoadStatus::Fresh => println!("load=fresh"),
        LoadStatus::Ephemeral => println!("load=ephemeral"),
    }

    println!("due_date_policy={:?}", store.config().due_date_policy);

    let snapshot = store.snapshot();
    println!(
        "progress={}% completed={} pending={} total={}",
        snapshot.progress.percent(),
        snapshot.progress.completed_count,
        snapshot.progress.pending_count(),
        snapshot.progress.total_count
    );
    for task in &snapshot.tasks {
        let mark = if task.is_completed { 'x' } else { ' ' };
        match task.due_date {
            Some(date) => println!("[{mark}] {} (due {date}) {}", task.title, task.id),
            None => println!("[{mark}] {} {}", task.title, task.id),
        }
    }
    ExitCode::SUCCESS
}
