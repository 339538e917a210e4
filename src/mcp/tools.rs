//! Business operations exposed as MCP tools.
//!
//! Each tool builds an HTTP request for its operation's route and hands it to
//! the same [`ApiBackend`] the REST routes use, so both surfaces stay in step.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use futures_util::future::BoxFuture;
use serde_json::{json, Map, Value};

use crate::api::{ApiBackend, ApiOperation};
use crate::http::request::X_REQUEST_ID;
use crate::mcp::server::{Tool, ToolContext, ToolDefinition, ToolError};
use crate::routing::{RouteMethod, RouteTable};

pub struct OperationTool {
    operation: ApiOperation,
    method: Method,
    path: String,
    backend: Arc<dyn ApiBackend>,
}

impl OperationTool {
    /// Bind `operation` to its route. POST is preferred when the operation
    /// is reachable by several methods, since it carries a JSON body.
    pub fn from_table(
        table: &RouteTable,
        operation: ApiOperation,
        backend: Arc<dyn ApiBackend>,
    ) -> Option<Self> {
        let entries: Vec<_> = table.api_entries(operation).collect();
        let entry = entries
            .iter()
            .find(|e| e.method == RouteMethod::Post)
            .or_else(|| entries.first())?;

        let method = match entry.method {
            RouteMethod::Get => Method::GET,
            RouteMethod::Delete => Method::DELETE,
            RouteMethod::Post | RouteMethod::Any => Method::POST,
        };

        Some(Self {
            operation,
            method,
            path: entry.path.clone(),
            backend,
        })
    }

    fn build_request(
        &self,
        arguments: &Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Request<Body>, ToolError> {
        let mut builder = Request::builder().method(self.method.clone());
        if let Some(id) = &context.request_id {
            builder = builder.header(X_REQUEST_ID, id.as_str());
        }

        let request = if self.method == Method::POST {
            let body = serde_json::to_vec(arguments)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
            builder
                .uri(self.path.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
        } else {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in arguments {
                match value {
                    Value::Null => {}
                    Value::String(s) => {
                        query.append_pair(key, s);
                    }
                    other => {
                        query.append_pair(key, &other.to_string());
                    }
                }
            }
            let query = query.finish();
            let uri = if query.is_empty() {
                self.path.clone()
            } else {
                format!("{}?{}", self.path, query)
            };
            builder.uri(uri).body(Body::empty())
        };

        request.map_err(|e| ToolError::Failed(e.to_string()))
    }
}

impl Tool for OperationTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.operation.name().to_string(),
            description: self.operation.description().to_string(),
            input_schema: json!({ "type": "object", "additionalProperties": true }),
        }
    }

    fn call(
        &self,
        arguments: Value,
        context: ToolContext,
    ) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let arguments = match arguments {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    return Err(ToolError::InvalidArguments(format!(
                        "expected an object, got {other}"
                    )))
                }
            };

            let request = self.build_request(&arguments, &context)?;
            let response = self.backend.call(self.operation, request).await;
            let status = response.status();

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .map_err(|e| ToolError::Failed(e.to_string()))?;
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

            if status.is_success() {
                Ok(body)
            } else {
                Err(ToolError::Backend {
                    status: status.as_u16(),
                    body: body.to_string(),
                })
            }
        })
    }
}

/// One tool per routed operation.
pub fn operation_tools(table: &RouteTable, backend: Arc<dyn ApiBackend>) -> Vec<Arc<dyn Tool>> {
    ApiOperation::ALL
        .into_iter()
        .filter_map(|operation| OperationTool::from_table(table, operation, backend.clone()))
        .map(|tool| Arc::new(tool) as Arc<dyn Tool>)
        .collect()
}
