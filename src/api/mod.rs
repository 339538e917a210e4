//! Business API capability.
//!
//! # Data Flow
//! ```text
//! /api/v1/... request
//!     → routing table (method + path → ApiOperation)
//!     → ApiBackend::call(operation, request)
//!         → UpstreamBackend   (relay to business service)
//!         → UnconfiguredBackend (503)
//! ```

pub mod backend;
pub mod operation;
pub mod upstream;

pub use backend::{ApiBackend, UnconfiguredBackend};
pub use operation::ApiOperation;
pub use upstream::{UpstreamBackend, UpstreamError, X_API_OPERATION};
