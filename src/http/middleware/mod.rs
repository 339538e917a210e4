//! Request interceptors.
//!
//! Stack order, outermost first: metrics → recovery → cors → handler.
//! Recovery wraps CORS so a panic anywhere below is still answered.

pub mod cors;
pub mod metrics;
pub mod recovery;

pub use cors::{apply_cors_headers, cors_middleware};
pub use metrics::track_metrics;
pub use recovery::recovery_middleware;
