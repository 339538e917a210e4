//! HTTP gateway for an MCP-enabled content service.
//!
//! Fronts a business service with a fixed route table, CORS handling,
//! panic recovery and a Streamable HTTP MCP endpoint.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mcp;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
