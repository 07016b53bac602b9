/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC parsing, method routing and the stdio transport.

pub mod dispatcher;
pub mod protocol;
pub mod server;

// Re-export main types
pub use dispatcher::{Dispatcher, Method};
pub use server::McpServer;
