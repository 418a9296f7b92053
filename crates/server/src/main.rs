//! InfoVault caching worker entry point.
//!
//! Boots the worker and serves host events as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use infovault_client::{FetchClient, FetchConfig};
use infovault_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod body;
mod clients;
mod dispatch;
mod error;
mod events;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        static_generation = %config.static_generation(),
        dynamic_generation = %config.dynamic_generation(),
        db_path = %config.db_path.display(),
        "Starting infovault worker on stdio transport"
    );

    let db = CacheDb::open(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open cache store: {e}"))?;
    let network = FetchClient::new(FetchConfig::from(&config)).map_err(|e| anyhow::anyhow!("{e}"))?;
    let dispatcher = dispatch::Dispatcher::new(config, db, Arc::new(network)).map_err(|e| anyhow::anyhow!("{e}"))?;

    let handler = handler::WorkerServer::new(Arc::new(dispatcher));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
