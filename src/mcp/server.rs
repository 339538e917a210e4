//! MCP method dispatch and tool registry.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest};

/// Newest first; the first entry is offered when the client asks for an
/// unknown version.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("backend answered {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("{0}")]
    Failed(String),
}

/// Facts about the inbound HTTP request a tool call arrived on.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// `x-request-id` of the protocol request, carried onto outbound calls.
    pub request_id: Option<String>,
}

/// A callable tool exposed through `tools/list` and `tools/call`.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn call(&self, arguments: Value, context: ToolContext)
        -> BoxFuture<'_, Result<Value, ToolError>>;
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Answers MCP requests. Holds no per-session state.
pub struct McpServer {
    info: ServerInfo,
    tools: Vec<Arc<dyn Tool>>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            tools: Vec::new(),
        }
    }

    /// Register a tool. On a name clash the first registration wins.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools<I>(self, tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        tools.into_iter().fold(self, McpServer::with_tool)
    }

    /// Answer one request with its `result` value.
    pub async fn handle_request(
        &self,
        request: &JsonRpcRequest,
        context: &ToolContext,
    ) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params.clone(), context).await,
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    pub fn handle_notification(&self, notification: &JsonRpcNotification) {
        tracing::debug!(method = %notification.method, "MCP notification");
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": self.info,
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<ToolDefinition> = self.tools.iter().map(|t| t.definition()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(
        &self,
        params: Option<Value>,
        context: &ToolContext,
    ) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
            })?;

        let tool = self
            .tools
            .iter()
            .find(|t| t.definition().name == params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("unknown tool: {}", params.name)))?;

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        match tool.call(arguments, context.clone()).await {
            Ok(output) => Ok(tool_result(output, false)),
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "Tool call failed");
                Ok(tool_result(Value::String(e.to_string()), true))
            }
        }
    }
}

fn tool_result(output: Value, is_error: bool) -> Value {
    let text = match &output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut result = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    });
    if output.is_object() {
        result["structuredContent"] = output;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::jsonrpc::RequestId;

    struct Echo;

    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".into(),
                description: "Echo the arguments".into(),
                input_schema: json!({ "type": "object" }),
            }
        }

        fn call(
            &self,
            mut arguments: Value,
            context: ToolContext,
        ) -> BoxFuture<'_, Result<Value, ToolError>> {
            Box::pin(async move {
                if arguments.get("fail").is_some() {
                    return Err(ToolError::Failed("asked to fail".into()));
                }
                if let Some(id) = context.request_id {
                    arguments["request_id"] = Value::String(id);
                }
                Ok(arguments)
            })
        }
    }

    fn server() -> McpServer {
        McpServer::new("test-server", "1.2.3").with_tool(Arc::new(Echo))
    }

    async fn handle(server: &McpServer, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        server.handle_request(request, &ToolContext::default()).await
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: RequestId::Number(1),
            method: method.into(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn test_initialize_negotiates_version() {
        let server = server();

        let known = handle(
            &server,
            &request("initialize", json!({ "protocolVersion": "2024-11-05" })),
        )
        .await
        .unwrap();
        assert_eq!(known["protocolVersion"], "2024-11-05");
        assert_eq!(known["serverInfo"]["name"], "test-server");

        let unknown = handle(
            &server,
            &request("initialize", json!({ "protocolVersion": "1999-01-01" })),
        )
        .await
        .unwrap();
        assert_eq!(unknown["protocolVersion"], SUPPORTED_PROTOCOL_VERSIONS[0]);
    }

    #[tokio::test]
    async fn test_tools_list_and_call() {
        let server = server();

        let list = handle(&server, &request("tools/list", json!({}))).await.unwrap();
        assert_eq!(list["tools"][0]["name"], "echo");
        assert_eq!(list["tools"][0]["inputSchema"]["type"], "object");

        let ok = handle(
            &server,
            &request(
                "tools/call",
                json!({ "name": "echo", "arguments": { "keyword": "rust" } }),
            ),
        )
        .await
        .unwrap();
        assert_eq!(ok["isError"], false);
        assert_eq!(ok["structuredContent"]["keyword"], "rust");
        assert!(ok["structuredContent"].get("request_id").is_none());

        let failed = handle(
            &server,
            &request(
                "tools/call",
                json!({ "name": "echo", "arguments": { "fail": true } }),
            ),
        )
        .await
        .unwrap();
        assert_eq!(failed["isError"], true);
        assert_eq!(failed["content"][0]["text"], "asked to fail");
    }

    #[tokio::test]
    async fn test_call_context_reaches_tool() {
        let server = server();
        let context = ToolContext {
            request_id: Some("req-42".into()),
        };

        let result = server
            .handle_request(
                &request("tools/call", json!({ "name": "echo", "arguments": {} })),
                &context,
            )
            .await
            .unwrap();
        assert_eq!(result["structuredContent"]["request_id"], "req-42");
    }

    #[tokio::test]
    async fn test_call_errors() {
        let server = server();

        let unknown_tool = handle(&server, &request("tools/call", json!({ "name": "nope" })))
            .await
            .unwrap_err();
        assert_eq!(unknown_tool.code, JsonRpcError::INVALID_PARAMS);

        let unknown_method = handle(&server, &request("resources/list", json!({})))
            .await
            .unwrap_err();
        assert_eq!(unknown_method.code, JsonRpcError::METHOD_NOT_FOUND);
    }
}
