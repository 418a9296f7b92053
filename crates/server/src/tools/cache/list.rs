//! cache_list tool implementation.
//!
//! Lists generations with their entry counts.

use infovault_core::{CacheDb, GenerationInfo};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheListOutput {
    pub generations: Vec<GenerationInfo>,
}

pub async fn list_impl(cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let generations = cache.list_generations().await?;
    json_result(&CacheListOutput { generations })
}
