//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Middleware and handlers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The request id set by the HTTP layer is attached to every event that
//! concerns a request.

pub mod logging;
pub mod metrics;
