//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, layer stack)
//!     → request.rs (request ID)
//!     → middleware/ (metrics, recovery, CORS)
//!     → routing table dispatch
//!         → health.rs | ProtocolHandler | ApiBackend
//!     → response.rs envelopes for gateway-generated replies
//! ```

pub mod health;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{respond_error, respond_success, ErrorCode, ErrorResponse, SuccessResponse};
pub use server::{AppState, HttpServer, ServerError};
