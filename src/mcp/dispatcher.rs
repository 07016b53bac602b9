/// Routes JSON-RPC methods to their handlers
///
/// Protocol problems (unknown method, unknown tool, malformed params) come
/// back as `JsonRpcError`. Tool failures do not: they are folded into a
/// successful `tools/call` result flagged with `isError`.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{ToolContext, ToolRegistry};

/// The methods this server understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    Ping,
    ListTools,
    CallTool,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Method::Initialize),
            "notifications/initialized" | "initialized" => Some(Method::Initialized),
            "ping" => Some(Method::Ping),
            "tools/list" => Some(Method::ListTools),
            "tools/call" => Some(Method::CallTool),
            _ => None,
        }
    }
}

/// Stateless request handler shared by all in-flight requests
pub struct Dispatcher {
    registry: ToolRegistry,
    context: ToolContext,
}

impl Dispatcher {
    pub fn new(context: ToolContext) -> Self {
        Self {
            registry: ToolRegistry::new(),
            context,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request envelope
    ///
    /// Returns `None` for notifications, which never get a response even
    /// when they fail.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let outcome = self.dispatch(&request.method, request.params).await;

        let Some(id) = request.id else {
            if let Err(e) = outcome {
                debug!("Notification '{}' failed: {}", request.method, e.message);
            }
            return None;
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    /// Run a method and produce its result payload
    pub async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match Method::parse(method) {
            Some(Method::Initialize) => to_payload(self.initialize()),
            Some(Method::Initialized) | Some(Method::Ping) => Ok(json!({})),
            Some(Method::ListTools) => Ok(json!({ "tools": self.registry.definitions() })),
            Some(Method::CallTool) => to_payload(self.call_tool(params).await?),
            None => Err(JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
            )),
        }
    }

    fn initialize(&self) -> InitializeResult {
        info!("MCP client connected");
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Handle tools/call
    ///
    /// Only an unknown tool or unusable params are protocol errors; whatever
    /// the tool itself returns is wrapped into a `ToolCallResult`.
    pub async fn call_tool(&self, params: Option<Value>) -> Result<ToolCallResult, JsonRpcError> {
        let params = params
            .ok_or_else(|| JsonRpcError::new(error_codes::INVALID_PARAMS, "Missing parameters"))?;
        let call: ToolCallParams = serde_json::from_value(params).map_err(|e| {
            JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid parameters: {}", e))
        })?;

        let tool = self.registry.lookup(&call.name).ok_or_else(|| {
            JsonRpcError::new(error_codes::METHOD_NOT_FOUND, format!("Unknown tool: {}", call.name))
        })?;

        debug!("Calling tool {}", call.name);
        let result = match tool.execute(&self.context, call.arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::success(text),
                Err(e) => ToolCallResult::error(e.to_string()),
            },
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                ToolCallResult::error(e.to_string())
            }
        };

        Ok(result)
    }
}

fn to_payload<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}
