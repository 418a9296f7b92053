//! Cache inspection tools.
//!
//! Read-only views of the generation store.

pub mod get;
pub mod list;

pub use get::{CacheGetParams, get_impl};
pub use list::list_impl;
