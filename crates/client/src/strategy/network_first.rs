use infovault_core::{Error, Request};

use super::{Resolved, Resolver, Source};

impl Resolver {
    /// Prefer the live network; fall back to the last stored copy in
    /// `generation` when the transport fails.
    pub async fn network_first(&self, request: &Request, generation: &str) -> Result<Resolved, Error> {
        let id = request.identity();
        match self.network.fetch(request).await {
            Ok(response) => {
                self.write_through(generation, request, &response).await;
                Ok(Resolved { response, source: Source::Network })
            }
            Err(err) if err.is_transport() => {
                tracing::info!(%id, "network failed, trying cache: {err}");
                match self.lookup(generation, &id).await {
                    Some(response) => Ok(Resolved { response, source: Source::Cache }),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}
