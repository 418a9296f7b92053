//! Cache-first and network-first resolution.
//!
//! Both strategies write successful network responses through to the
//! generation they are bound to. Non-success responses reach the caller
//! but are never stored.

mod cache_first;
mod network_first;

use std::sync::Arc;

use infovault_core::{AppConfig, CacheDb, Error, Request, ResourceId, Response};
use serde::Serialize;

use crate::fetch::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
}

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Network,
    /// The shell document, served in place of an unreachable resource.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub response: Response,
    pub source: Source,
}

/// Runs the strategies against one store and one network.
#[derive(Clone)]
pub struct Resolver {
    db: CacheDb,
    network: Arc<dyn Network>,
    static_generation: String,
    fallback: ResourceId,
}

impl Resolver {
    pub fn new(db: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let fallback = Request::parse("GET", &config.fallback_path, &origin)?.identity();
        Ok(Self { db, network, static_generation: config.static_generation(), fallback })
    }

    pub async fn resolve(&self, strategy: Strategy, request: &Request, generation: &str) -> Result<Resolved, Error> {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request, generation).await,
            Strategy::NetworkFirst => self.network_first(request, generation).await,
        }
    }

    /// Store a successful response. A failed write is logged; the caller
    /// still gets the response.
    async fn write_through(&self, generation: &str, request: &Request, response: &Response) {
        if !response.is_success() {
            tracing::debug!(url = %request.url, status = response.status, "not caching non-success response");
            return;
        }
        if let Err(e) = self.db.put(generation, &request.identity(), response).await {
            tracing::warn!(url = %request.url, generation, "write-through failed: {e}");
        }
    }

    /// Read an entry, treating store failures as a miss.
    async fn lookup(&self, generation: &str, id: &ResourceId) -> Option<Response> {
        match self.db.get_entry(generation, id).await {
            Ok(entry) => entry.map(|e| e.to_response()),
            Err(e) => {
                tracing::warn!(%id, generation, "cache lookup failed: {e}");
                None
            }
        }
    }
}
