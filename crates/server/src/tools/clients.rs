//! Application instance registration and message delivery.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::clients::ClientMessage;
use crate::dispatch::Dispatcher;
use crate::error::HostError;

/// Parameters for the client_connect tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientConnectParams {
    /// Host-chosen instance id.
    pub id: String,

    /// URL the instance is showing (default: the application root).
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    "/".into()
}

/// Parameters naming one instance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientIdParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientConnectOutput {
    pub id: String,
    pub url: String,
    pub new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientMessagesOutput {
    pub id: String,
    pub messages: Vec<ClientMessage>,
}

pub async fn connect_impl(dispatcher: &Dispatcher, params: ClientConnectParams) -> Result<CallToolResult, McpError> {
    if params.id.trim().is_empty() {
        return Err(HostError::InvalidInput("id cannot be empty".into()).into());
    }
    let url = dispatcher.request("GET", &params.url)?.url.to_string();
    let new = dispatcher.clients().connect(&params.id, &url).await;
    json_result(&ClientConnectOutput { id: params.id, url, new })
}

pub async fn disconnect_impl(dispatcher: &Dispatcher, params: ClientIdParams) -> Result<CallToolResult, McpError> {
    if !dispatcher.clients().disconnect(&params.id).await {
        return Err(HostError::UnknownClient(params.id).into());
    }
    json_result(&serde_json::json!({ "id": params.id, "disconnected": true }))
}

pub async fn messages_impl(dispatcher: &Dispatcher, params: ClientIdParams) -> Result<CallToolResult, McpError> {
    let messages = dispatcher
        .clients()
        .drain(&params.id)
        .await
        .ok_or_else(|| HostError::UnknownClient(params.id.clone()))?;
    json_result(&ClientMessagesOutput { id: params.id, messages })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::worker::{SyncParams, sync_impl};
    use super::*;

    #[tokio::test]
    async fn test_connect_resolves_url() {
        let (dispatcher, _network) = dispatcher().await;
        let params = ClientConnectParams { id: "tab-1".into(), url: "/".into() };
        let value = output(&connect_impl(&dispatcher, params).await.unwrap());
        assert_eq!(value["url"], "http://localhost:5173/");
        assert_eq!(value["new"], true);
    }

    #[tokio::test]
    async fn test_messages_after_sync() {
        let (dispatcher, _network) = dispatcher().await;
        connect_impl(&dispatcher, ClientConnectParams { id: "tab-1".into(), url: "/".into() })
            .await
            .unwrap();
        sync_impl(&dispatcher, SyncParams { tag: "background-sync".into() })
            .await
            .unwrap();

        let value = output(&messages_impl(&dispatcher, ClientIdParams { id: "tab-1".into() }).await.unwrap());
        assert_eq!(value["messages"][0]["type"], "BACKGROUND_SYNC");
        assert_eq!(value["messages"][0]["message"], "Background sync completed");
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let (dispatcher, _network) = dispatcher().await;
        let err = messages_impl(&dispatcher, ClientIdParams { id: "ghost".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32030);
        let err = disconnect_impl(&dispatcher, ClientIdParams { id: "ghost".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32030);
    }
}
