//! Forwarding to the business service.
//!
//! The gateway does not implement the business handlers; it relays each
//! matched `/api/v1` request to the configured service and streams the
//! answer back. The bound operation travels in `x-api-operation`.

use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        uri::{Authority, InvalidUri, Scheme},
        HeaderMap, HeaderValue, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use thiserror::Error;

use crate::api::backend::ApiBackend;
use crate::api::operation::ApiOperation;
use crate::http::request::RequestIdExt;
use crate::http::response::{respond_error, ErrorCode};

pub const X_API_OPERATION: &str = "x-api-operation";

/// Connection-scoped headers that must not be relayed.
static HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream address: {0}")]
    InvalidAddress(#[from] InvalidUri),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream unreachable: {0}")]
    Unavailable(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            UpstreamError::InvalidAddress(_) | UpstreamError::Request(_) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::BadGateway)
            }
            UpstreamError::Unavailable(_) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::UpstreamUnavailable)
            }
            UpstreamError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, ErrorCode::UpstreamTimeout),
        };
        respond_error(status, code, "business service request failed", json!(self.to_string()))
    }
}

/// Relays operations to a business service over HTTP/1.1.
#[derive(Clone)]
pub struct UpstreamBackend {
    authority: Authority,
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl UpstreamBackend {
    pub fn new(address: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let authority = Authority::from_str(address)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            authority,
            client,
            timeout,
        })
    }

    pub fn address(&self) -> &str {
        self.authority.as_str()
    }

    async fn forward(
        &self,
        operation: ApiOperation,
        request: Request<Body>,
    ) -> Result<Response, UpstreamError> {
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        if let Ok(host) = HeaderValue::from_str(self.authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }
        parts.headers.insert(
            HeaderName::from_static(X_API_OPERATION),
            HeaderValue::from_static(operation.name()),
        );

        let pending = self.client.request(Request::from_parts(parts, body));
        let response = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

impl ApiBackend for UpstreamBackend {
    fn call(&self, operation: ApiOperation, request: Request<Body>) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let start = Instant::now();
            let request_id = request.request_id().unwrap_or("unknown").to_string();

            tracing::debug!(
                request_id = %request_id,
                operation = %operation,
                upstream = %self.authority,
                "Forwarding request"
            );

            match self.forward(operation, request).await {
                Ok(response) => {
                    tracing::debug!(
                        request_id = %request_id,
                        operation = %operation,
                        status = %response.status(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Upstream answered"
                    );
                    response
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        operation = %operation,
                        error = %e,
                        "Upstream error"
                    );
                    e.into_response()
                }
            }
        })
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
