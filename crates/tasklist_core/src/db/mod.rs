//! SQLite bootstrap for key-value task storage.
//!
//! # Responsibility
//! - Open and configure the connection behind `SqliteKvAdapter`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Adapters must not touch tables before migrations succeed.
//! - Failures surface as `PersistError`, the same type the store sees from
//!   every adapter.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
