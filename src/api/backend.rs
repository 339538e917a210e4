//! Business-handler capability.
//!
//! The `/api/v1` handlers live outside the gateway. The router hands each
//! matched request to an [`ApiBackend`] together with the operation the
//! route is bound to.

use axum::{body::Body, http::Request, http::StatusCode, response::Response};
use futures_util::future::BoxFuture;
use serde_json::json;

use crate::api::operation::ApiOperation;
use crate::http::response::{respond_error, ErrorCode};

/// Something that can serve business operations.
pub trait ApiBackend: Send + Sync {
    fn call(&self, operation: ApiOperation, request: Request<Body>) -> BoxFuture<'_, Response>;
}

/// Backend used when no business service is configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredBackend;

impl ApiBackend for UnconfiguredBackend {
    fn call(&self, operation: ApiOperation, _request: Request<Body>) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            tracing::warn!(operation = %operation, "No business service configured");
            respond_error(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "business service is not configured",
                json!({ "operation": operation.name() }),
            )
        })
    }
}
