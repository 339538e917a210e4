//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Assemble the handler capabilities (business backend, protocol handler)
//! - Build the axum Router from the route table
//! - Wire up middleware (trace, request ID, metrics, recovery, CORS, limits)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::{ApiBackend, UnconfiguredBackend, UpstreamBackend, UpstreamError};
use crate::config::GatewayConfig;
use crate::http::middleware::{cors_middleware, recovery_middleware, track_metrics};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::mcp::{
    operation_tools, McpServer, ProtocolHandler, StreamableHttpHandler, StreamableHttpOptions,
};
use crate::routing::{self, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ApiBackend>,
    pub protocol: Arc<dyn ProtocolHandler>,
    pub service_name: Arc<str>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream configuration: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server with the built-in capabilities: the configured
    /// business service (or a 503 stand-in) and the MCP transport whose tools
    /// call that same service.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let api: Arc<dyn ApiBackend> = match &config.upstream.address {
            Some(address) => {
                let backend = UpstreamBackend::new(
                    address,
                    Duration::from_secs(config.timeouts.upstream_secs),
                )?;
                tracing::info!(upstream = %backend.address(), "Business service configured");
                Arc::new(backend)
            }
            None => {
                tracing::warn!("No upstream configured; API routes will answer 503");
                Arc::new(UnconfiguredBackend)
            }
        };

        let table = RouteTable::standard();
        let server = McpServer::new(&config.mcp.server_name, &config.mcp.server_version)
            .with_tools(operation_tools(&table, api.clone()));
        let protocol = Arc::new(StreamableHttpHandler::new(
            Arc::new(server),
            StreamableHttpOptions {
                stateless: config.mcp.stateless,
                json_response: config.mcp.json_response,
                session_idle_timeout: Duration::from_secs(config.mcp.session_idle_secs),
                max_sessions: config.mcp.max_sessions,
            },
        ));

        Ok(Self::with_handlers(config, &table, api, protocol))
    }

    /// Create a server around caller-supplied capabilities.
    pub fn with_handlers(
        config: GatewayConfig,
        table: &RouteTable,
        api: Arc<dyn ApiBackend>,
        protocol: Arc<dyn ProtocolHandler>,
    ) -> Self {
        let state = AppState {
            api,
            protocol,
            service_name: Arc::from(config.server.service_name.as_str()),
        };

        if config.server.mode.is_debug() {
            routing::log_routes(table);
        }

        let router = Self::build_router(&config, table, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-first in the reverse of the order they are
    /// added: trace → request id → metrics → recovery → CORS → limits.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, table: &RouteTable, state: AppState) -> Router {
        routing::routes(table)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn(cors_middleware))
            .layer(middleware::from_fn(recovery_middleware))
            .layer(middleware::from_fn(track_metrics))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or the process receives SIGINT/SIGTERM.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = ?self.config.server.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
