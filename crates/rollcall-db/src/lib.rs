//! Rollcall Database: in-memory repository implementations and the
//! persisted snapshot that backs them.
//!
//! This crate provides:
//! - A shared in-memory store ([`MemoryDb`]) and repository handles
//!   over it
//! - The versioned snapshot layout and legacy migration ([`Snapshot`])
//! - File persistence ([`SnapshotStore`], [`StoreConfig`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{SnapshotStore, StoreConfig};
pub use error::DbError;
pub use repository::MemoryDb;
pub use schema::{SCHEMA_VERSION, Snapshot, migrate};
