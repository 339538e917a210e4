//! Streamable HTTP transport for MCP.
//!
//! POST carries JSON-RPC messages. In stateless mode no session id is issued
//! or checked, which lets browsers call the endpoint even when they cannot
//! read `Mcp-Session-Id`. In stateful mode `initialize` opens a session and
//! every later request must present it. Sessions idle longer than the
//! configured timeout are forgotten, and the live count is capped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use serde_json::json;
use uuid::Uuid;

use crate::http::request::RequestIdExt;
use crate::http::response::{respond_error, ErrorCode};
use crate::mcp::jsonrpc::{classify, parse_payload, JsonRpcError, JsonRpcResponse, Message};
use crate::mcp::server::{McpServer, ToolContext};

pub const MCP_SESSION_ID: HeaderName = HeaderName::from_static("mcp-session-id");

/// Capability the router delegates the protocol endpoint to.
pub trait ProtocolHandler: Send + Sync {
    fn handle(&self, request: Request<Body>) -> BoxFuture<'_, Response>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamableHttpOptions {
    /// Skip session management entirely.
    pub stateless: bool,
    /// Reply with `application/json` rather than a one-event SSE stream.
    pub json_response: bool,
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for StreamableHttpOptions {
    fn default() -> Self {
        Self {
            stateless: true,
            json_response: true,
            session_idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 1024,
        }
    }
}

pub struct StreamableHttpHandler {
    server: Arc<McpServer>,
    options: StreamableHttpOptions,
    /// Session id → last time it was used.
    sessions: DashMap<String, Instant>,
}

impl StreamableHttpHandler {
    pub fn new(server: Arc<McpServer>, options: StreamableHttpOptions) -> Self {
        Self {
            server,
            options,
            sessions: DashMap::new(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    async fn serve(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        if method == Method::POST {
            self.handle_post(request).await
        } else if method == Method::DELETE && !self.options.stateless {
            self.handle_delete(request.headers())
        } else {
            self.method_not_allowed()
        }
    }

    async fn handle_post(&self, request: Request<Body>) -> Response {
        if !is_json(request.headers()) {
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type must be application/json",
            )
                .into_response();
        }
        let session_id = session_id(request.headers());
        let context = ToolContext {
            request_id: request.request_id().map(str::to_string),
        };

        let bytes = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return rpc_error(StatusCode::BAD_REQUEST, JsonRpcError::parse_error(e.to_string()))
            }
        };
        let (batch, values) = match parse_payload(&bytes) {
            Ok(parsed) => parsed,
            Err(error) => return rpc_error(StatusCode::BAD_REQUEST, error),
        };
        let messages: Vec<Message> = values.into_iter().map(classify).collect();

        let issued = if self.options.stateless {
            None
        } else {
            let initializing = messages
                .iter()
                .any(|m| matches!(m, Message::Request(r) if r.method == "initialize"));
            if initializing {
                match self.open_session() {
                    Ok(id) => Some(id),
                    Err(response) => return response,
                }
            } else if let Err(response) = self.touch_session(session_id.as_deref()) {
                return response;
            } else {
                None
            }
        };

        let mut responses = Vec::new();
        for message in messages {
            match message {
                Message::Request(request) => {
                    let response = match self.server.handle_request(&request, &context).await {
                        Ok(result) => JsonRpcResponse::success(request.id, result),
                        Err(error) => {
                            tracing::debug!(method = %request.method, error = %error, "MCP request failed");
                            JsonRpcResponse::failure(Some(request.id), error)
                        }
                    };
                    responses.push(response);
                }
                Message::Notification(notification) => {
                    self.server.handle_notification(&notification)
                }
                Message::Response => {}
                Message::Invalid(id, error) => responses.push(JsonRpcResponse::failure(id, error)),
            }
        }

        let mut response = if responses.is_empty() {
            StatusCode::ACCEPTED.into_response()
        } else {
            let payload = if batch {
                serde_json::to_string(&responses)
            } else {
                serde_json::to_string(&responses[0])
            };
            match payload {
                Ok(payload) => self.encode(payload),
                Err(e) => {
                    return respond_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalError,
                        "failed to encode protocol response",
                        e.to_string(),
                    )
                }
            }
        };

        if let Some(id) = issued.and_then(|id| HeaderValue::from_str(&id).ok()) {
            response.headers_mut().insert(MCP_SESSION_ID, id);
        }
        response
    }

    fn handle_delete(&self, headers: &HeaderMap) -> Response {
        let id = session_id(headers);
        if let Err(response) = self.touch_session(id.as_deref()) {
            return response;
        }
        if let Some(id) = id {
            self.sessions.remove(&id);
            tracing::info!(session_id = %id, "MCP session closed");
        }
        StatusCode::NO_CONTENT.into_response()
    }

    fn open_session(&self) -> Result<String, Response> {
        let idle = self.options.session_idle_timeout;
        self.sessions.retain(|_, last_seen| last_seen.elapsed() <= idle);

        if self.sessions.len() >= self.options.max_sessions {
            tracing::warn!(max_sessions = self.options.max_sessions, "MCP session limit reached");
            return Err(respond_error(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "session limit reached",
                json!({ "max_sessions": self.options.max_sessions }),
            ));
        }

        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Instant::now());
        tracing::info!(session_id = %id, "MCP session opened");
        Ok(id)
    }

    /// Check the presented session and mark it used.
    fn touch_session(&self, id: Option<&str>) -> Result<(), Response> {
        let unknown = || {
            rpc_error(
                StatusCode::NOT_FOUND,
                JsonRpcError::invalid_request("unknown session"),
            )
        };
        let Some(id) = id else {
            return Err(rpc_error(
                StatusCode::BAD_REQUEST,
                JsonRpcError::invalid_request("missing Mcp-Session-Id header"),
            ));
        };

        let expired = match self.sessions.get_mut(id) {
            Some(mut last_seen) if last_seen.elapsed() <= self.options.session_idle_timeout => {
                *last_seen = Instant::now();
                false
            }
            Some(_) => true,
            None => return Err(unknown()),
        };
        if expired {
            self.sessions.remove(id);
            tracing::info!(session_id = %id, "MCP session expired");
            return Err(unknown());
        }
        Ok(())
    }

    fn method_not_allowed(&self) -> Response {
        let allow = if self.options.stateless {
            "POST"
        } else {
            "POST, DELETE"
        };
        (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, allow)],
        )
            .into_response()
    }

    fn encode(&self, payload: String) -> Response {
        if self.options.json_response {
            (
                [(header::CONTENT_TYPE, "application/json")],
                payload,
            )
                .into_response()
        } else {
            (
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                format!("event: message\ndata: {payload}\n\n"),
            )
                .into_response()
        }
    }
}

impl ProtocolHandler for StreamableHttpHandler {
    fn handle(&self, request: Request<Body>) -> BoxFuture<'_, Response> {
        Box::pin(self.serve(request))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("application/json"))
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(MCP_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn rpc_error(status: StatusCode, error: JsonRpcError) -> Response {
    (status, Json(JsonRpcResponse::failure(None, error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn handler(options: StreamableHttpOptions) -> StreamableHttpHandler {
        StreamableHttpHandler::new(Arc::new(McpServer::new("test", "0.0.1")), options)
    }

    fn post(body: Value, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(id) = session {
            builder = builder.header(MCP_SESSION_ID, id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_stateless_ping_returns_json() {
        let handler = handler(StreamableHttpOptions::default());
        let response = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}), None))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(MCP_SESSION_ID).is_none());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 7, "result": {}}));
    }

    #[tokio::test]
    async fn test_stateless_rejects_get_and_delete() {
        let handler = handler(StreamableHttpOptions::default());
        for method in [Method::GET, Method::DELETE] {
            let response = handler
                .handle(Request::builder().method(method).uri("/mcp").body(Body::empty()).unwrap())
                .await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()[header::ALLOW], "POST");
        }
    }

    #[tokio::test]
    async fn test_notifications_only_is_accepted() {
        let handler = handler(StreamableHttpOptions::default());
        let response = handler
            .handle(post(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}), None))
            .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_answers_each_request() {
        let handler = handler(StreamableHttpOptions::default());
        let response = handler
            .handle(post(
                json!([
                    {"jsonrpc": "2.0", "id": 1, "method": "ping"},
                    {"jsonrpc": "2.0", "method": "notifications/initialized"},
                    {"jsonrpc": "2.0", "id": 2, "method": "nope"}
                ]),
                None,
            ))
            .await;

        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_and_wrong_content_type() {
        let handler = handler(StreamableHttpOptions::default());

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{oops"))
            .unwrap();
        let response = handler.handle(malformed).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"]["code"], JsonRpcError::PARSE_ERROR);

        let text = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("ping"))
            .unwrap();
        assert_eq!(handler.handle(text).await.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_event_stream_encoding() {
        let handler = handler(StreamableHttpOptions {
            json_response: false,
            ..Default::default()
        });
        let response = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}), None))
            .await;

        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        let text = body_text(response).await;
        assert!(text.starts_with("event: message\ndata: {"));
        assert!(text.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_stateful_session_lifecycle() {
        let handler = handler(StreamableHttpOptions {
            stateless: false,
            ..Default::default()
        });

        let missing = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}), None))
            .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let init = handler
            .handle(post(
                json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
                None,
            ))
            .await;
        assert_eq!(init.status(), StatusCode::OK);
        let session = init.headers()[MCP_SESSION_ID].to_str().unwrap().to_string();
        assert_eq!(handler.session_count(), 1);

        let ping = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}), Some(&session)))
            .await;
        assert_eq!(ping.status(), StatusCode::OK);

        let stranger = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}), Some("bogus")))
            .await;
        assert_eq!(stranger.status(), StatusCode::NOT_FOUND);

        let close = handler
            .handle(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/mcp")
                    .header(MCP_SESSION_ID, session.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(close.status(), StatusCode::NO_CONTENT);
        assert_eq!(handler.session_count(), 0);
    }

    fn initialize() -> Request<Body> {
        post(
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            None,
        )
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let handler = handler(StreamableHttpOptions {
            stateless: false,
            session_idle_timeout: Duration::from_millis(1),
            ..Default::default()
        });

        let init = handler.handle(initialize()).await;
        let session = init.headers()[MCP_SESSION_ID].to_str().unwrap().to_string();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let ping = handler
            .handle(post(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}), Some(&session)))
            .await;
        assert_eq!(ping.status(), StatusCode::NOT_FOUND);
        assert_eq!(handler.session_count(), 0);
    }

    #[tokio::test]
    async fn test_session_cap_refuses_initialize() {
        let handler = handler(StreamableHttpOptions {
            stateless: false,
            max_sessions: 2,
            ..Default::default()
        });

        for _ in 0..2 {
            assert_eq!(handler.handle(initialize()).await.status(), StatusCode::OK);
        }
        let refused = handler.handle(initialize()).await;
        assert_eq!(refused.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(refused.headers().get(MCP_SESSION_ID).is_none());
        assert_eq!(handler.session_count(), 2);
    }

    #[tokio::test]
    async fn test_expired_sessions_free_capacity() {
        let handler = handler(StreamableHttpOptions {
            stateless: false,
            max_sessions: 1,
            session_idle_timeout: Duration::from_millis(1),
            ..Default::default()
        });

        assert_eq!(handler.handle(initialize()).await.status(), StatusCode::OK);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handler.handle(initialize()).await.status(), StatusCode::OK);
        assert_eq!(handler.session_count(), 1);
    }
}
