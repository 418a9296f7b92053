//! MCP server handler implementation.
//!
//! This module exposes every host event and inspection call as an MCP tool
//! and routes tool calls to the dispatcher.
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::tools::{
    ClientConnectParams, ClientIdParams, FetchParams, NotificationClickParams, PushParams, SyncParams, cache, clients,
    worker,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The stdio host binding for the caching worker.
#[derive(Clone)]
pub struct WorkerServer {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<Dispatcher>,
}

#[tool_router]
impl WorkerServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { tool_router: Self::tool_router(), dispatcher }
    }

    #[tool(
        description = "Resolve an outgoing resource request through the caching engine. Non-GET requests return passthrough."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        worker::fetch_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Install event: populate the static cache generation from the manifest.")]
    async fn install(&self) -> Result<CallToolResult, McpError> {
        worker::install_impl(&self.dispatcher).await
    }

    #[tool(description = "Activate event: delete stale cache generations and claim open clients.")]
    async fn activate(&self) -> Result<CallToolResult, McpError> {
        worker::activate_impl(&self.dispatcher).await
    }

    #[tool(description = "Sync event. The background-sync tag notifies every client.")]
    async fn sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        worker::sync_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Push event: render a notification from a JSON payload with optional title and body.")]
    async fn push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        worker::push_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Notification click. The explore action opens the application root.")]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        worker::click_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Connectivity restored: broadcast ONLINE_STATUS online=true.")]
    async fn online(&self) -> Result<CallToolResult, McpError> {
        worker::status_impl(&self.dispatcher, true).await
    }

    #[tool(description = "Connectivity lost: broadcast ONLINE_STATUS online=false.")]
    async fn offline(&self) -> Result<CallToolResult, McpError> {
        worker::status_impl(&self.dispatcher, false).await
    }

    #[tool(description = "Report lifecycle state, active generation names and open clients.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        worker::worker_status_impl(&self.dispatcher).await
    }

    #[tool(description = "Register an application instance so it receives worker messages.")]
    async fn client_connect(&self, params: Parameters<ClientConnectParams>) -> Result<CallToolResult, McpError> {
        clients::connect_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Forget an application instance.")]
    async fn client_disconnect(&self, params: Parameters<ClientIdParams>) -> Result<CallToolResult, McpError> {
        clients::disconnect_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Drain messages queued for an application instance.")]
    async fn client_messages(&self, params: Parameters<ClientIdParams>) -> Result<CallToolResult, McpError> {
        clients::messages_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "List cache generations with entry counts and sizes.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        cache::list_impl(self.dispatcher.db()).await
    }

    #[tool(description = "Get a stored entry by URL, optionally from a single generation.")]
    async fn cache_get(&self, params: Parameters<cache::CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.dispatcher, params.0).await
    }
}

impl ServerHandler for WorkerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "infovault-worker".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
