use infovault_core::{Error, Request};

use super::{Resolved, Resolver, Source};

impl Resolver {
    /// Serve from `generation` when present, otherwise from the network.
    ///
    /// Once an entry is stored, identical requests never reach the network
    /// again until the generation is rotated. If the transport fails, the
    /// shell document from the static generation stands in; without it the
    /// fetch error is returned. Other errors are returned as they are.
    pub async fn cache_first(&self, request: &Request, generation: &str) -> Result<Resolved, Error> {
        let id = request.identity();
        if let Some(response) = self.lookup(generation, &id).await {
            tracing::debug!(%id, generation, "cache hit");
            return Ok(Resolved { response, source: Source::Cache });
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.write_through(generation, request, &response).await;
                Ok(Resolved { response, source: Source::Network })
            }
            Err(err) if err.is_transport() => {
                tracing::error!(%id, "cache first strategy failed: {err}");
                match self.lookup(&self.static_generation, &self.fallback).await {
                    Some(response) => {
                        tracing::debug!(%id, fallback = %self.fallback, "serving shell fallback");
                        Ok(Resolved { response, source: Source::Fallback })
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}
