//! Install and activate.
//!
//! Install populates the static generation from the manifest, all or
//! nothing. Activate drops every generation that is not one of the two
//! currently designated names.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;
use infovault_core::{AppConfig, CacheDb, Error, Request};
use serde::Serialize;

use crate::fetch::Network;

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub generation: String,
    pub cached: usize,
    /// The new worker asks to replace any waiting one immediately.
    pub skip_waiting: bool,
    pub installed_at: String,
}

/// Outcome of an activation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
}

pub struct Lifecycle {
    db: CacheDb,
    network: Arc<dyn Network>,
    manifest: Vec<Request>,
    static_generation: String,
    dynamic_generation: String,
}

impl Lifecycle {
    /// Resolve the manifest against the application origin.
    pub fn new(db: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let manifest = config
            .manifest
            .iter()
            .map(|entry| Request::parse("GET", entry, &origin))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            db,
            network,
            manifest,
            static_generation: config.static_generation(),
            dynamic_generation: config.dynamic_generation(),
        })
    }

    pub fn manifest(&self) -> &[Request] {
        &self.manifest
    }

    /// Fetch every manifest entry and store them in the static generation.
    ///
    /// Any transport failure or non-success status fails the whole install
    /// and nothing is written. There is no automatic retry.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        tracing::info!(generation = %self.static_generation, "worker installing");
        self.db.open_generation(&self.static_generation).await?;

        let fetched = try_join_all(self.manifest.iter().map(|request| async move {
            let response = self
                .network
                .fetch(request)
                .await
                .map_err(|e| Error::InstallFailed { url: request.url.to_string(), reason: e.to_string() })?;
            if !response.is_success() {
                return Err(Error::InstallFailed {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            Ok((request.identity(), response))
        }))
        .await;

        let entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("error caching static files: {e}");
                return Err(e);
            }
        };

        let cached = self.db.put_all(&self.static_generation, entries).await.inspect_err(|e| {
            tracing::error!("error caching static files: {e}");
        })?;

        tracing::info!(cached, "static files cached; skipping waiting");
        Ok(InstallReport {
            generation: self.static_generation.clone(),
            cached,
            skip_waiting: true,
            installed_at: Utc::now().to_rfc3339(),
        })
    }

    /// Delete every generation outside the current static/dynamic pair.
    ///
    /// Deletion is sequential; the first store failure aborts the rest of
    /// the sweep.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        tracing::info!("worker activating");
        let names = self.db.generation_names().await?;

        let mut report = ActivateReport { deleted: Vec::new(), retained: Vec::new() };
        for name in names {
            if name == self.static_generation || name == self.dynamic_generation {
                report.retained.push(name);
                continue;
            }
            tracing::info!(generation = %name, "deleting old cache");
            self.db.delete_generation(&name).await?;
            report.deleted.push(name);
        }

        tracing::info!(deleted = report.deleted.len(), "worker activated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockNetwork;

    const STATIC: &str = "infovault-static-v1.0.0";
    const DYNAMIC: &str = "infovault-dynamic-v1.0.0";

    async fn lifecycle(manifest: &[&str]) -> (Lifecycle, CacheDb, Arc<MockNetwork>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(MockNetwork::new());
        let config = AppConfig { manifest: manifest.iter().map(|s| s.to_string()).collect(), ..Default::default() };
        let lifecycle = Lifecycle::new(db.clone(), network.clone(), &config).unwrap();
        (lifecycle, db, network)
    }

    #[tokio::test]
    async fn test_install_populates_static_generation() {
        let (lifecycle, db, network) = lifecycle(&["/", "/index.html"]).await;
        network
            .respond("http://localhost:5173/", 200, "<html>root</html>")
            .respond("http://localhost:5173/index.html", 200, "<html>index</html>");

        let report = lifecycle.install().await.unwrap();
        assert_eq!(report.cached, 2);
        assert_eq!(report.generation, STATIC);
        assert!(report.skip_waiting);
        assert_eq!(db.entry_count(STATIC).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_install_unreachable_entry_fails_and_writes_nothing() {
        let (lifecycle, db, network) = lifecycle(&["/", "/index.html", "https://cdn.example/all.css"]).await;
        network
            .respond("http://localhost:5173/", 200, "root")
            .respond("http://localhost:5173/index.html", 200, "index");

        let err = lifecycle.install().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { ref url, .. } if url == "https://cdn.example/all.css"));
        assert_eq!(db.entry_count(STATIC).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_install_non_success_status_fails() {
        let (lifecycle, db, network) = lifecycle(&["/", "/index.html"]).await;
        network
            .respond("http://localhost:5173/", 200, "root")
            .respond("http://localhost:5173/index.html", 404, "gone");

        let err = lifecycle.install().await.unwrap_err();
        assert!(err.to_string().contains("status 404"));
        assert_eq!(db.entry_count(STATIC).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_old_generations() {
        let (lifecycle, db, _network) = lifecycle(&["/"]).await;
        db.open_generation("infovault-static-v0.9.0").await.unwrap();

        assert!(lifecycle.install().await.is_err());
        let names = db.generation_names().await.unwrap();
        assert!(names.contains(&"infovault-static-v0.9.0".to_string()));
    }

    #[tokio::test]
    async fn test_activate_keeps_only_current_pair() {
        let (lifecycle, db, _network) = lifecycle(&["/"]).await;
        for name in ["infovault-static-v0.9.0", STATIC, "infovault-dynamic-v0.9.0", DYNAMIC, "scratch"] {
            db.open_generation(name).await.unwrap();
        }

        let report = lifecycle.activate().await.unwrap();
        assert_eq!(report.deleted.len(), 3);
        let mut remaining = db.generation_names().await.unwrap();
        remaining.sort();
        assert_eq!(remaining, vec![DYNAMIC.to_string(), STATIC.to_string()]);
    }

    #[tokio::test]
    async fn test_activate_with_nothing_stale() {
        let (lifecycle, db, _network) = lifecycle(&["/"]).await;
        db.open_generation(STATIC).await.unwrap();

        let report = lifecycle.activate().await.unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.retained, vec![STATIC.to_string()]);
    }

    #[tokio::test]
    async fn test_manifest_resolves_against_origin() {
        let (lifecycle, _db, _network) = lifecycle(&["/", "https://cdnjs.cloudflare.com/a.css"]).await;
        let urls: Vec<String> = lifecycle.manifest().iter().map(|r| r.url.to_string()).collect();
        assert_eq!(urls, vec!["http://localhost:5173/", "https://cdnjs.cloudflare.com/a.css"]);
    }

    #[tokio::test]
    async fn test_activate_stops_at_first_failed_delete() {
        let (db, raw, _dir) = crate::strategy::test_support::file_store().await;
        let lifecycle = Lifecycle::new(db.clone(), Arc::new(MockNetwork::new()), &AppConfig::default()).unwrap();
        crate::strategy::test_support::tamper(
            &raw,
            "INSERT INTO generations (name, created_at) VALUES
                ('infovault-static-v0.1.0', '2024-01-01T00:00:00Z'),
                ('infovault-static-v0.2.0', '2024-01-02T00:00:00Z'),
                ('infovault-static-v0.3.0', '2024-01-03T00:00:00Z');
             CREATE TRIGGER pin_generation BEFORE DELETE ON generations
             WHEN OLD.name = 'infovault-static-v0.2.0'
             BEGIN SELECT RAISE(ABORT, 'generation pinned'); END;",
        )
        .await;

        assert!(lifecycle.activate().await.is_err());
        let names = db.generation_names().await.unwrap();
        assert_eq!(names, vec!["infovault-static-v0.2.0".to_string(), "infovault-static-v0.3.0".to_string()]);
    }
}
