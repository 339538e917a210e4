//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Process-wide server settings (mode, service name).
    pub server: ServerConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Protocol endpoint settings.
    pub mcp: McpConfig,

    /// Business service that owns the `/api/v1` handlers.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server operating mode, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Quiet logging, no route dump.
    #[default]
    Release,
    /// Verbose logging and registered routes printed at startup.
    Debug,
}

impl ServerMode {
    pub fn is_debug(self) -> bool {
        matches!(self, ServerMode::Debug)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub mode: ServerMode,

    /// Name reported by the health endpoint.
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: ServerMode::Release,
            service_name: "mcp-gateway".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:18060").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:18060".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for an inbound request, in seconds.
    pub request_secs: u64,

    /// Time allowed for the business service to answer, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024 * 1024, // video uploads
        }
    }
}

/// Protocol endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct McpConfig {
    /// Serve without session affinity (no `Mcp-Session-Id`).
    pub stateless: bool,

    /// Answer with `application/json` instead of an event stream.
    pub json_response: bool,

    /// Name advertised in the `initialize` result.
    pub server_name: String,

    /// Version advertised in the `initialize` result.
    pub server_version: String,

    /// Stateful mode: a session unused for this long is forgotten.
    pub session_idle_secs: u64,

    /// Stateful mode: `initialize` is refused once this many sessions are live.
    pub max_sessions: usize,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            stateless: true,
            json_response: true,
            server_name: "mcp-gateway".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            session_idle_secs: 30 * 60,
            max_sessions: 1024,
        }
    }
}

/// Business service location.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Address of the business service (e.g., "127.0.0.1:18061").
    /// When unset every API route answers 503.
    pub address: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). Empty means derive from mode.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: String::new(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [server]
            mode = "debug"

            [upstream]
            address = "127.0.0.1:18061"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.mode, ServerMode::Debug);
        assert_eq!(config.server.service_name, "mcp-gateway");
        assert_eq!(config.upstream.address.as_deref(), Some("127.0.0.1:18061"));
        assert!(config.mcp.stateless);
        assert!(config.mcp.json_response);
        assert_eq!(config.listener.bind_address, "0.0.0.0:18060");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<GatewayConfig, _> = toml::from_str("[server]\nmode = \"turbo\"\n");
        assert!(result.is_err());
    }
}
