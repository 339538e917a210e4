//! Liveness responder.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::http::response::respond_success;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: String,
    pub timestamp: u64,
}

/// `GET /health`. No dependencies: if the process can answer, it is alive.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    respond_success(
        HealthStatus {
            status: "healthy",
            service: state.service_name.to_string(),
            timestamp,
        },
        "service is healthy",
    )
}
