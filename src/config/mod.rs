//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once while the server is assembled
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload because the
//!   route table is frozen before the first request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, McpConfig, ObservabilityConfig, SecurityConfig, ServerConfig,
    ServerMode, TimeoutConfig, UpstreamConfig,
};
