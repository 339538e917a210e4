//! mcp-gateway
//!
//! ```text
//!   Client ──▶ trace ─▶ request id ─▶ metrics ─▶ recovery ─▶ CORS ─▶ limits
//!                                                                    │
//!              ┌───────────────────────┬─────────────────────────────┤
//!              ▼                       ▼                             ▼
//!           /health              /mcp, /mcp/*                    /api/v1/*
//!           liveness          MCP transport (tools) ──────▶ ApiBackend ──▶ Business
//!                                                                          Service
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mcp_gateway::config::{self, GatewayConfig, ServerMode};
use mcp_gateway::observability::{logging, metrics};
use mcp_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "HTTP gateway with CORS, panic recovery and an MCP endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override server.mode.
    #[arg(short, long, value_enum)]
    mode: Option<ServerMode>,

    /// Override upstream.address.
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(mode) = cli.mode {
        config.server.mode = mode;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.address = Some(upstream);
    }
    config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init_logging(&config.observability, config.server.mode);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mcp-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.server.mode,
        stateless = config.mcp.stateless,
        json_response = config.mcp.json_response,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
