//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): by method, route pattern, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_recovered_panics_total` (counter): handler panics turned into 500s
//! - `gateway_cors_preflight_total` (counter): OPTIONS answered by the CORS layer
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_recovered_panic() {
    counter!("gateway_recovered_panics_total").increment(1);
}

pub fn record_preflight() {
    counter!("gateway_cors_preflight_total").increment(1);
}
