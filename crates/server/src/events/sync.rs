//! Background sync and connectivity broadcasts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clients::{ClientMessage, Clients};

const SYNC_COMPLETED: &str = "Background sync completed";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutcome {
    pub tag: String,
    /// False when the tag is not the one this worker handles.
    pub handled: bool,
    pub notified: usize,
}

/// Notify every instance that a sync for `expected_tag` ran. Other tags are ignored.
pub async fn background_sync(clients: &Clients, tag: &str, expected_tag: &str) -> SyncOutcome {
    if tag != expected_tag {
        tracing::debug!(tag, "ignoring sync tag");
        return SyncOutcome { tag: tag.to_string(), handled: false, notified: 0 };
    }

    tracing::info!(tag, "background sync triggered");
    let notified = clients
        .post_all(ClientMessage::BackgroundSync { message: SYNC_COMPLETED.to_string() })
        .await;
    SyncOutcome { tag: tag.to_string(), handled: true, notified }
}

/// Broadcast a connectivity change. Returns how many instances were told.
pub async fn online_status(clients: &Clients, online: bool) -> usize {
    if online {
        tracing::info!("app is online");
    } else {
        tracing::info!("app is offline");
    }
    clients.post_all(ClientMessage::OnlineStatus { online }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_notifies_clients() {
        let clients = Clients::new();
        clients.connect("a", "http://localhost:5173/").await;

        let outcome = background_sync(&clients, "background-sync", "background-sync").await;
        assert!(outcome.handled);
        assert_eq!(outcome.notified, 1);
        assert_eq!(
            clients.drain("a").await.unwrap(),
            vec![ClientMessage::BackgroundSync { message: "Background sync completed".into() }]
        );
    }

    #[tokio::test]
    async fn test_other_tag_ignored() {
        let clients = Clients::new();
        clients.connect("a", "http://localhost:5173/").await;

        let outcome = background_sync(&clients, "periodic-refresh", "background-sync").await;
        assert!(!outcome.handled);
        assert!(clients.drain("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_online_status_broadcast() {
        let clients = Clients::new();
        clients.connect("a", "http://localhost:5173/").await;
        clients.connect("b", "http://localhost:5173/").await;

        assert_eq!(online_status(&clients, false).await, 2);
        assert_eq!(clients.drain("b").await.unwrap(), vec![ClientMessage::OnlineStatus { online: false }]);
    }
}
