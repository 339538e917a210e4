//! Error-recovery middleware.
//!
//! Runs the rest of the stack inside `catch_unwind` so a panicking handler
//! becomes a 500 `INTERNAL_ERROR` response instead of a dropped connection.
//! Each recovery is scoped to the request that panicked; nothing is shared
//! between requests.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::Request,
    http::{header::ORIGIN, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use serde_json::Value;

use crate::http::middleware::cors::apply_cors_headers;
use crate::http::request::RequestIdExt;
use crate::http::response::{respond_error, ErrorCode};
use crate::observability::metrics;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

pub async fn recovery_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let origin = request.headers().get(ORIGIN).cloned();
    let request_id = request.request_id().unwrap_or("unknown").to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                panic = %detail,
                "Recovered from handler panic"
            );
            metrics::record_recovered_panic();

            let mut response = respond_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                INTERNAL_ERROR_MESSAGE,
                Value::String(detail),
            );
            // The panic unwound through the CORS layer, so its headers are gone.
            apply_cors_headers(origin.as_ref(), response.headers_mut());
            response
        }
    }
}

/// Render a panic payload. `panic!` produces `&str` or `String`.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
