//! Event dispatcher.
//!
//! The host calls [`Dispatcher::dispatch`] once per occurrence of an event.
//! Every event kind maps to exactly one handler; nothing registers itself.

use std::sync::Arc;

use infovault_client::{ActivateReport, InstallReport, Lifecycle, Network, Resolver, Route, Router, Source};
use infovault_core::{AppConfig, CacheDb, Error, Request};
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::body::EncodedBody;
use crate::clients::Clients;
use crate::events::{self, ClickOutcome, Notification, SyncOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
    Push,
    NotificationClick,
    Online,
    Offline,
}

#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { data: Option<String> },
    NotificationClick { action: Option<String> },
    Online,
    Offline,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Sync { .. } => EventKind::Sync,
            Event::Push { .. } => EventKind::Push,
            Event::NotificationClick { .. } => EventKind::NotificationClick,
            Event::Online => EventKind::Online,
            Event::Offline => EventKind::Offline,
        }
    }
}

/// Lifecycle position as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installed,
    Activated,
}

/// A resolved response as handed back to the host.
#[derive(Debug, Clone, Serialize)]
pub struct ServedResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(flatten)]
    pub content: EncodedBody,
    pub source: Source,
    pub route: Route,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Installed { report: InstallReport },
    Activated { report: ActivateReport, claimed: usize },
    /// The engine declined; the host sends the request to the network as-is.
    Passthrough,
    Responded { response: ServedResponse },
    Synced { result: SyncOutcome },
    Notified { notification: Option<Notification> },
    Clicked { result: ClickOutcome },
    Status { online: bool, notified: usize },
}

pub struct Dispatcher {
    config: AppConfig,
    origin: Url,
    db: CacheDb,
    router: Router,
    resolver: Resolver,
    lifecycle: Lifecycle,
    clients: Clients,
    state: RwLock<WorkerState>,
}

impl Dispatcher {
    pub fn new(config: AppConfig, db: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let router = Router::new(&config).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let resolver = Resolver::new(db.clone(), network.clone(), &config)?;
        let lifecycle = Lifecycle::new(db.clone(), network, &config)?;

        Ok(Self {
            config,
            origin,
            db,
            router,
            resolver,
            lifecycle,
            clients: Clients::new(),
            state: RwLock::new(WorkerState::Parsed),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Build a request from host input, resolving relative URLs against the
    /// application origin.
    pub fn request(&self, method: &str, url: &str) -> Result<Request, Error> {
        Ok(Request::parse(method, url, &self.origin)?)
    }

    pub async fn dispatch(&self, event: Event) -> Result<Outcome, Error> {
        let kind = event.kind();
        tracing::debug!(?kind, "dispatching event");

        let outcome = match event {
            Event::Install => self.on_install().await,
            Event::Activate => self.on_activate().await,
            Event::Fetch(request) => self.on_fetch(request).await,
            Event::Sync { tag } => {
                let result = events::background_sync(&self.clients, &tag, &self.config.sync_tag).await;
                Ok(Outcome::Synced { result })
            }
            Event::Push { data } => {
                let notification = events::push::handle(data.as_deref(), &self.config.app_name)?;
                Ok(Outcome::Notified { notification })
            }
            Event::NotificationClick { action } => {
                let result = events::notification_click(&self.clients, action.as_deref(), &self.origin).await;
                Ok(Outcome::Clicked { result })
            }
            Event::Online => self.on_status(true).await,
            Event::Offline => self.on_status(false).await,
        };

        if let Err(e) = &outcome {
            tracing::warn!(?kind, "event failed: {e}");
        }
        outcome
    }

    async fn on_install(&self) -> Result<Outcome, Error> {
        let report = self.lifecycle.install().await?;
        *self.state.write().await = WorkerState::Installed;
        Ok(Outcome::Installed { report })
    }

    async fn on_activate(&self) -> Result<Outcome, Error> {
        let report = self.lifecycle.activate().await?;
        let claimed = self.clients.claim().await;
        *self.state.write().await = WorkerState::Activated;
        Ok(Outcome::Activated { report, claimed })
    }

    async fn on_fetch(&self, request: Request) -> Result<Outcome, Error> {
        let Some(route) = self.router.classify(&request) else {
            return Ok(Outcome::Passthrough);
        };

        let resolved = self
            .resolver
            .resolve(route.strategy, &request, &route.generation)
            .await?;
        let response = resolved.response;

        Ok(Outcome::Responded {
            response: ServedResponse {
                content: EncodedBody::encode(&response.body),
                url: response.url,
                status: response.status,
                headers: response.headers,
                source: resolved.source,
                route,
            },
        })
    }

    async fn on_status(&self, online: bool) -> Result<Outcome, Error> {
        let notified = events::online_status(&self.clients, online).await;
        Ok(Outcome::Status { online, notified })
    }
}
