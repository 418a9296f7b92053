//! SQLite-backed cache store partitioned into named generations.
//!
//! This module provides a persistent store keyed by resource identity using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - SHA-256 store keys over `(method, url)`
//! - Named, versioned generations created on first write
//! - Whole-entry writes (UPSERT or batch transaction), never partial
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use generations::{GenerationInfo, StoredEntry};
