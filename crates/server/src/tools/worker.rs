//! Lifecycle, fetch and notification tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::dispatch::{Dispatcher, Event};
use crate::error::HostError;

/// Parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Request URL; relative paths resolve against the application origin.
    pub url: String,

    /// HTTP method (default: GET). Non-GET requests are not handled.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Parameters for the sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync registration tag.
    pub tag: String,
}

/// Parameters for the push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Raw push data, expected to be a JSON object with optional title and body.
    #[serde(default)]
    pub data: Option<String>,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// The clicked action; absent when the notification body was clicked.
    #[serde(default)]
    pub action: Option<String>,
}

/// Snapshot of the worker for the host.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatusOutput {
    pub state: crate::dispatch::WorkerState,
    pub static_generation: String,
    pub dynamic_generation: String,
    pub clients: Vec<crate::clients::ClientInfo>,
}

pub async fn fetch_impl(dispatcher: &Dispatcher, params: FetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }
    let request = dispatcher.request(&params.method, &params.url)?;
    let outcome = dispatcher.dispatch(Event::Fetch(request)).await?;
    json_result(&outcome)
}

pub async fn install_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher.dispatch(Event::Install).await?;
    json_result(&outcome)
}

pub async fn activate_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher.dispatch(Event::Activate).await?;
    json_result(&outcome)
}

pub async fn sync_impl(dispatcher: &Dispatcher, params: SyncParams) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher.dispatch(Event::Sync { tag: params.tag }).await?;
    json_result(&outcome)
}

pub async fn push_impl(dispatcher: &Dispatcher, params: PushParams) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher.dispatch(Event::Push { data: params.data }).await?;
    json_result(&outcome)
}

pub async fn click_impl(dispatcher: &Dispatcher, params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher
        .dispatch(Event::NotificationClick { action: params.action })
        .await?;
    json_result(&outcome)
}

pub async fn status_impl(dispatcher: &Dispatcher, online: bool) -> Result<CallToolResult, McpError> {
    let event = if online { Event::Online } else { Event::Offline };
    let outcome = dispatcher.dispatch(event).await?;
    json_result(&outcome)
}

pub async fn worker_status_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let output = WorkerStatusOutput {
        state: dispatcher.state().await,
        static_generation: dispatcher.config().static_generation(),
        dynamic_generation: dispatcher.config().dynamic_generation(),
        clients: dispatcher.clients().list().await,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let (dispatcher, _network) = dispatcher().await;
        let params = FetchParams { url: "  ".into(), method: "GET".into() };
        assert!(fetch_impl(&dispatcher, params).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_passthrough_output() {
        let (dispatcher, _network) = dispatcher().await;
        let params = FetchParams { url: "/api/data".into(), method: "DELETE".into() };
        let result = fetch_impl(&dispatcher, params).await.unwrap();
        assert_eq!(output(&result)["outcome"], "passthrough");
    }

    #[tokio::test]
    async fn test_install_tool() {
        let (dispatcher, network) = dispatcher().await;
        network
            .respond("http://localhost:5173/", 200, "root")
            .respond("http://localhost:5173/index.html", 200, "index");

        let result = install_impl(&dispatcher).await.unwrap();
        let value = output(&result);
        assert_eq!(value["outcome"], "installed");
        assert_eq!(value["report"]["cached"], 2);
        assert_eq!(value["report"]["skip_waiting"], true);
    }

    #[tokio::test]
    async fn test_install_tool_failure_is_error() {
        let (dispatcher, _network) = dispatcher().await;
        let err = install_impl(&dispatcher).await.unwrap_err();
        assert_eq!(err.code.0, -32020);
    }

    #[tokio::test]
    async fn test_push_tool() {
        let (dispatcher, _network) = dispatcher().await;
        let params = PushParams { data: Some(r#"{"title":"T","body":"B"}"#.into()) };
        let value = output(&push_impl(&dispatcher, params).await.unwrap());
        assert_eq!(value["notification"]["title"], "T");
        assert_eq!(value["notification"]["actions"][0]["action"], "explore");
        assert_eq!(value["notification"]["actions"][1]["action"], "close");
    }

    #[tokio::test]
    async fn test_worker_status_tool() {
        let (dispatcher, _network) = dispatcher().await;
        let value = output(&worker_status_impl(&dispatcher).await.unwrap());
        assert_eq!(value["state"], "parsed");
        assert_eq!(value["static_generation"], "infovault-static-v1.0.0");
    }
}
