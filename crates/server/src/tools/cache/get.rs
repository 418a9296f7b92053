//! cache_get tool implementation.
//!
//! Retrieves a stored entry by URL, from one generation or from any.

use infovault_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::body::EncodedBody;
use crate::dispatch::Dispatcher;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the stored resource; relative paths resolve against the origin.
    pub url: String,

    /// Generation to search. All generations are searched when omitted.
    #[serde(default)]
    pub generation: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub generation: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(flatten)]
    pub content: EncodedBody,
    pub stored_at: String,
}

pub async fn get_impl(dispatcher: &Dispatcher, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let id = dispatcher.request("GET", &params.url)?.identity();
    let entry = match &params.generation {
        Some(generation) => dispatcher.db().get_entry(generation, &id).await?,
        None => dispatcher.db().match_any(&id).await?,
    }
    .ok_or_else(|| Error::CacheMiss(id.url.clone()))?;

    json_result(&CacheGetOutput {
        content: EncodedBody::encode(&entry.body),
        generation: entry.generation,
        method: entry.method,
        url: entry.url,
        status: entry.status,
        headers: entry.headers,
        stored_at: entry.stored_at,
    })
}
