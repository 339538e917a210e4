//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     table.rs  RouteTable::standard()  (health, /mcp, /api/v1 group)
//!     → router.rs  (merge by path, bind handlers)
//!     → frozen axum Router
//!
//! Request:
//!     (method, path) → exact match → handler
//!     no match → default 404
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact method/path matching; the only wildcard is the protocol sub-path
//! - Handlers are capabilities held in state, so tests can substitute them

pub mod router;
pub mod table;

pub use router::{log_routes, routes};
pub use table::{RouteEntry, RouteMethod, RouteTable, RouteTarget};
