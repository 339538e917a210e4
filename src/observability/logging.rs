//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level, otherwise a
//! default derived from the server mode.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ObservabilityConfig, ServerMode};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(config: &ObservabilityConfig, mode: ServerMode) -> String {
    let level = if config.log_level.trim().is_empty() {
        if mode.is_debug() {
            "debug"
        } else {
            "info"
        }
    } else {
        config.log_level.trim()
    };
    format!("mcp_gateway={level},tower_http={level}")
}

/// Install the global subscriber. Call once, before the server is built.
pub fn init_logging(config: &ObservabilityConfig, mode: ServerMode) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(config, mode).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
