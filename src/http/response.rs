//! Response envelopes shared by every gateway-generated reply.
//!
//! Errors are `{code, message, detail}`; successes are
//! `{success, data, message}`. Business handlers behind the gateway produce
//! their own bodies; these shapes only cover what the gateway says itself.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Machine-readable error codes emitted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InternalError,
    ServiceUnavailable,
    UpstreamUnavailable,
    UpstreamTimeout,
    BadGateway,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            ErrorCode::BadGateway => "BAD_GATEWAY",
        }
    }
}

/// Structured error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    pub detail: Value,
}

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Build an error response with the given status.
pub fn respond_error(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    detail: impl Into<Value>,
) -> Response {
    let body = ErrorResponse {
        code,
        message: message.into(),
        detail: detail.into(),
    };
    (status, Json(body)).into_response()
}

/// Build a 200 response wrapping `data` in the success envelope.
pub fn respond_success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    let body = SuccessResponse {
        success: true,
        data,
        message: message.into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let response = respond_error(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ServiceUnavailable,
            "no backend",
            Value::Null,
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "SERVICE_UNAVAILABLE",
                "message": "no backend",
                "detail": null,
            })
        );
    }

    #[test]
    fn test_error_code_serializes_like_as_str() {
        for code in [
            ErrorCode::InternalError,
            ErrorCode::ServiceUnavailable,
            ErrorCode::UpstreamUnavailable,
            ErrorCode::UpstreamTimeout,
            ErrorCode::BadGateway,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }
}
