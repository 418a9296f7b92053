//! Open application instances and the messaging channel to them.
//!
//! Each instance has an inbox; broadcasts are queued per instance and
//! drained by the host. An inbox holds at most [`INBOX_CAPACITY`] messages;
//! past that the oldest are dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const INBOX_CAPACITY: usize = 64;

/// Structured message posted to application instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    BackgroundSync { message: String },
    OnlineStatus { online: bool },
}

/// Public view of one instance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientInfo {
    pub id: String,
    pub url: String,
    /// Whether this worker controls the instance.
    pub controlled: bool,
    pub pending: usize,
}

/// Result of asking for a window at some URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "window", rename_all = "snake_case")]
pub enum WindowAction {
    Focused { id: String },
    Opened { id: String },
}

#[derive(Debug)]
struct ClientState {
    url: String,
    controlled: bool,
    inbox: VecDeque<ClientMessage>,
}

#[derive(Debug, Default)]
pub struct Clients {
    inner: RwLock<HashMap<String, ClientState>>,
    next_window: AtomicU64,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance. Returns false if the id was already known, in
    /// which case only its URL is updated.
    pub async fn connect(&self, id: &str, url: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.get_mut(id) {
            Some(state) => {
                state.url = url.to_string();
                false
            }
            None => {
                inner.insert(
                    id.to_string(),
                    ClientState { url: url.to_string(), controlled: false, inbox: VecDeque::new() },
                );
                true
            }
        }
    }

    pub async fn disconnect(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Queue `message` for every instance. Returns how many received it.
    pub async fn post_all(&self, message: ClientMessage) -> usize {
        let mut inner = self.inner.write().await;
        for (id, state) in inner.iter_mut() {
            if state.inbox.len() >= INBOX_CAPACITY {
                state.inbox.pop_front();
                tracing::debug!(client = %id, "inbox full; dropped oldest message");
            }
            state.inbox.push_back(message.clone());
        }
        tracing::debug!(recipients = inner.len(), ?message, "posted client message");
        inner.len()
    }

    /// Take every queued message for `id`, oldest first.
    pub async fn drain(&self, id: &str) -> Option<Vec<ClientMessage>> {
        let mut inner = self.inner.write().await;
        inner.get_mut(id).map(|state| state.inbox.drain(..).collect())
    }

    /// Take control of every open instance without a reload.
    pub async fn claim(&self) -> usize {
        let mut inner = self.inner.write().await;
        for state in inner.values_mut() {
            state.controlled = true;
        }
        inner.len()
    }

    /// Focus an instance already showing `url`, or open a new one.
    pub async fn open_window(&self, url: &str) -> WindowAction {
        let mut inner = self.inner.write().await;
        let mut existing: Vec<&String> = inner.iter().filter(|(_, s)| s.url == url).map(|(id, _)| id).collect();
        existing.sort();
        if let Some(id) = existing.first() {
            return WindowAction::Focused { id: (*id).clone() };
        }

        let id = format!("window-{}", self.next_window.fetch_add(1, Ordering::Relaxed) + 1);
        inner.insert(id.clone(), ClientState { url: url.to_string(), controlled: true, inbox: VecDeque::new() });
        WindowAction::Opened { id }
    }

    pub async fn list(&self) -> Vec<ClientInfo> {
        let inner = self.inner.read().await;
        let mut infos: Vec<ClientInfo> = inner
            .iter()
            .map(|(id, s)| ClientInfo { id: id.clone(), url: s.url.clone(), controlled: s.controlled, pending: s.inbox.len() })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }
}
