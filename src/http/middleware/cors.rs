//! CORS middleware.
//!
//! Echoes a present `Origin` so credentialed browser requests are accepted
//! (a wildcard origin is rejected by browsers when credentials are sent).
//! Preflight requests are answered here and never reach a handler.

use axum::{
    extract::Request,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_EXPOSE_HEADERS, ORIGIN,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::observability::metrics;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, Mcp-Session-Id";
/// Custom headers are hidden from scripts unless listed here.
pub const EXPOSED_HEADERS: &str = "Mcp-Session-Id";

/// Write the CORS header set for a request that carried `origin`.
///
/// An empty `Origin` value is treated the same as a missing one.
pub fn apply_cors_headers(origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
    match origin.filter(|value| !value.is_empty()) {
        Some(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        None => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
}

pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    if request.method() == Method::OPTIONS {
        tracing::debug!(path = %request.uri().path(), "Answering CORS preflight");
        metrics::record_preflight();
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(origin.as_ref(), response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(origin.as_ref(), response.headers_mut());
    response
}
