//! SQLite persistence for issued identifiers.
//!
//! This crate owns the database file and provides:
//! - Idempotent schema setup (one table, indexes on scheme and category)
//! - Atomic insert-if-absent, so concurrent writers cannot both store the
//!   same identifier
//! - Point lookups and grouped counts for statistics
//!
//! A connection is opened per operation and closed when the operation
//! returns, on success and error paths alike. Coordination between writers,
//! in one process or many, is left to SQLite's locking.

mod record;
mod store;

pub use record::{IdentifierRecord, RecordMetadata};
pub use store::{CountSnapshot, IdentifierStore, StoreConfig, StoreError};
