//! Core types and shared functionality for the InfoVault caching worker.
//!
//! This crate provides:
//! - Generation-partitioned cache store with SQLite backend
//! - Resource identity and the request/response model
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, GenerationInfo, StoredEntry};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, ResourceId, Response, UrlError};
