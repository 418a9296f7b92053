//! Notification click handling.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::clients::{Clients, WindowAction};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClickOutcome {
    /// The notification is dismissed on every click.
    pub closed: bool,
    pub window: Option<WindowAction>,
}

/// `explore` opens the application root; anything else only dismisses.
pub async fn notification_click(clients: &Clients, action: Option<&str>, origin: &Url) -> ClickOutcome {
    if action != Some("explore") {
        return ClickOutcome { closed: true, window: None };
    }

    let root = origin.join("/").map(|u| u.to_string()).unwrap_or_else(|_| origin.to_string());
    let window = clients.open_window(&root).await;
    tracing::info!(?window, "notification explore");
    ClickOutcome { closed: true, window: Some(window) }
}
