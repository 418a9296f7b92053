//! Caching engine for the InfoVault worker.
//!
//! This crate provides the network fetch pipeline, request routing, the
//! cache-first and network-first strategies, and the install/activate
//! lifecycle, all on top of the store from `infovault-core`.

pub mod fetch;
pub mod lifecycle;
pub mod router;
pub mod strategy;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use lifecycle::{ActivateReport, InstallReport, Lifecycle};
pub use router::{Route, RouteRule, Router};
pub use strategy::{Resolved, Resolver, Source, Strategy};
