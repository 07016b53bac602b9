/// Public library interface for the Strapi MCP server
///
/// This module exports the main server implementation and the building blocks
/// (query encoding, backend client, tools, protocol types) so they can be used
/// by other applications or tests.

use std::sync::Arc;
use thiserror::Error;

// Internal modules
mod backend;
mod config;
mod query;
mod tools;
pub mod mcp;

// Re-export public modules and types
pub use backend::{Backend, BackendClient, BackendError, HttpMethod, ResponseBody};
pub use config::{Config, ConfigError};
pub use mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, ToolDefinition};
pub use mcp::{Dispatcher, McpServer, Method};
pub use query::{to_query_string, with_query, QueryValue};
pub use tools::{ToolContext, ToolError, ToolKind, ToolRegistry};
pub use tools::media::{MAX_MEDIA_PAGES, MEDIA_PAGE_SIZE};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend client error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

/// Main Strapi MCP server
///
/// Holds the frozen configuration and the HTTP backend, and serves the
/// tool registry over stdin/stdout.
pub struct StrapiMcpServer {
    config: Arc<Config>,
    backend: Arc<dyn Backend>,
}

impl StrapiMcpServer {
    /// Create a server talking to the real backend described by `config`
    pub fn new(config: Config) -> Result<Self, ServerError> {
        tracing::info!(
            "Initializing Strapi MCP server for {} (project root: {})",
            config.base_url(),
            config.project_root().display()
        );

        let backend = BackendClient::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a server with a custom backend implementation
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// Build the MCP server for this configuration
    pub fn mcp_server(&self) -> McpServer {
        let context = ToolContext::new(Arc::clone(&self.config), Arc::clone(&self.backend));
        McpServer::new(Dispatcher::new(context))
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Returns when stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        if self.config.api_token().is_none() {
            tracing::warn!("No API token configured, requests will be sent unauthenticated");
        }

        self.mcp_server().run().await
    }

    /// Get a reference to the configuration (useful for testing)
    pub fn config(&self) -> &Config {
        &self.config
    }
}
