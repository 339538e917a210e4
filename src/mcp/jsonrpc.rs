//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the request id could not be determined.
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} ({code})")]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;

    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {}", detail.into()))
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(Self::INVALID_REQUEST, format!("Invalid request: {}", detail.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, format!("Invalid params: {}", detail.into()))
    }
}

/// An inbound message after classification.
#[derive(Debug)]
pub enum Message {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A response from the client; nothing to answer.
    Response,
    Invalid(Option<RequestId>, JsonRpcError),
}

/// Parse an HTTP body into its messages. The flag is true for a batch.
pub fn parse_payload(bytes: &[u8]) -> Result<(bool, Vec<Value>), JsonRpcError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| JsonRpcError::parse_error(e.to_string()))?;

    match value {
        Value::Array(items) if items.is_empty() => {
            Err(JsonRpcError::invalid_request("empty batch"))
        }
        Value::Array(items) => Ok((true, items)),
        other => Ok((false, vec![other])),
    }
}

/// Decide what kind of message `value` is.
pub fn classify(value: Value) -> Message {
    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    let Some(object) = value.as_object() else {
        return Message::Invalid(None, JsonRpcError::invalid_request("expected an object"));
    };
    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Message::Invalid(id, JsonRpcError::invalid_request("jsonrpc must be \"2.0\""));
    }

    if object.contains_key("method") {
        let is_request = object.get("id").is_some_and(|id| !id.is_null());
        if is_request {
            match serde_json::from_value(value) {
                Ok(request) => Message::Request(request),
                Err(e) => Message::Invalid(id, JsonRpcError::invalid_request(e.to_string())),
            }
        } else {
            match serde_json::from_value(value) {
                Ok(notification) => Message::Notification(notification),
                Err(e) => Message::Invalid(None, JsonRpcError::invalid_request(e.to_string())),
            }
        }
    } else if object.contains_key("result") || object.contains_key("error") {
        Message::Response
    } else {
        Message::Invalid(id, JsonRpcError::invalid_request("missing method"))
    }
}
