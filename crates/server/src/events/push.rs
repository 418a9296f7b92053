//! Push payload parsing and notification rendering.

use chrono::Utc;
use infovault_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const ICON: &str = "/icons/icon-192x192.png";
const BADGE: &str = "/icons/icon-72x72.png";
const VIBRATE: [u32; 3] = [100, 50, 100];
const DEFAULT_BODY: &str = "New information available";

/// Payload sent by the push service. Both fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PushPayload {
    /// Parse the raw push data as JSON.
    pub fn parse(data: &str) -> Result<Self, Error> {
        serde_json::from_str(data).map_err(|e| Error::PushPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Epoch milliseconds.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification ready to be shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Render the notification for `payload`, titled `app_name` when the
/// payload carries no title.
pub fn render(payload: PushPayload, app_name: &str) -> Notification {
    let action = |action: &str, title: &str| NotificationAction {
        action: action.to_string(),
        title: title.to_string(),
        icon: BADGE.to_string(),
    };

    Notification {
        title: payload.title.unwrap_or_else(|| app_name.to_string()),
        body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: ICON.to_string(),
        badge: BADGE.to_string(),
        vibrate: VIBRATE.to_vec(),
        data: NotificationData { date_of_arrival: Utc::now().timestamp_millis(), primary_key: 1 },
        actions: vec![action("explore", "View"), action("close", "Close")],
    }
}

/// Handle a push. No data means nothing to show.
pub fn handle(data: Option<&str>, app_name: &str) -> Result<Option<Notification>, Error> {
    let Some(data) = data else {
        return Ok(None);
    };
    let payload = PushPayload::parse(data)?;
    Ok(Some(render(payload, app_name)))
}
