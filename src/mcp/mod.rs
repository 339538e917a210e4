//! Model Context Protocol endpoint.
//!
//! # Data Flow
//! ```text
//! ANY /mcp, /mcp/*
//!     → handler.rs  (HTTP transport: methods, content type, sessions)
//!     → jsonrpc.rs  (parse + classify messages)
//!     → server.rs   (initialize / ping / tools/*)
//!     → tools.rs    (operation tools → ApiBackend)
//! ```
//!
//! The router only knows the [`ProtocolHandler`] capability; the transport
//! here is the default implementation and can be swapped out.

pub mod handler;
pub mod jsonrpc;
pub mod server;
pub mod tools;

pub use handler::{ProtocolHandler, StreamableHttpHandler, StreamableHttpOptions, MCP_SESSION_ID};
pub use server::{McpServer, ServerInfo, Tool, ToolDefinition, ToolError};
pub use tools::{operation_tools, OperationTool};
