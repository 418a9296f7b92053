//! MCP tool implementations.
//!
//! Each host event is exposed as one tool; the tool body builds an
//! [`Event`](crate::dispatch::Event) and hands it to the dispatcher.

pub mod cache;
pub mod clients;
pub mod worker;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

pub use clients::{ClientConnectParams, ClientIdParams};
pub use worker::{FetchParams, NotificationClickParams, PushParams, SyncParams};

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| HostError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
