/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the line-oriented transport:
/// 1. Reads one JSON-RPC message per line from the input
/// 2. Dispatches each request on its own task, without waiting for earlier ones
/// 3. Writes responses, one per line, as they complete
///
/// Responses can therefore come back in a different order than the requests;
/// clients correlate them by `id`.

use std::sync::Arc;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::*;
use crate::ServerError;

/// MCP server that handles communication with the client
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests from `input` until it is closed
    ///
    /// Returns once every request read so far has been answered.
    pub async fn serve<R, W>(&self, input: R, output: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_responses(output, rx));

        let mut reader = BufReader::new(input);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => match std::str::from_utf8(&buf) {
                    Ok(line) => self.process_line(line, &tx),
                    Err(e) => error!("Failed to decode input line as UTF-8: {}", e),
                },
                Err(e) => {
                    error!("Failed to read from input: {}", e);
                    break;
                }
            }
        }

        // In-flight requests hold their own senders; the writer drains until the last one is done
        drop(tx);
        writer
            .await
            .map_err(|e| ServerError::Task(e.to_string()))??;

        Ok(())
    }

    /// Parse one line and hand it to the dispatcher
    fn process_line(&self, line: &str, tx: &mpsc::UnboundedSender<JsonRpcResponse>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        debug!("Processing request: {}", line);

        // No id can be recovered from invalid JSON, so nothing is sent back
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to parse JSON-RPC message: {}", e);
                return;
            }
        };

        let id = message.get("id").filter(|id| !id.is_null()).cloned();
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                match id {
                    Some(id) => {
                        let error = JsonRpcError::new(
                            error_codes::INVALID_REQUEST,
                            format!("Invalid request: {}", e),
                        );
                        let _ = tx.send(JsonRpcResponse::error(id, error));
                    }
                    None => warn!("Dropping invalid JSON-RPC message without id: {}", e),
                }
                return;
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = dispatcher.handle(request).await {
                // Only fails if the writer is gone, in which case there is nowhere to report to
                let _ = tx.send(response);
            }
        });
    }
}

async fn write_responses<W>(
    mut output: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let response_str = serde_json::to_string(&response)?;

        // Write response + newline
        output.write_all(response_str.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;

        debug!("Sent response: {}", response_str);
    }

    Ok(())
}
