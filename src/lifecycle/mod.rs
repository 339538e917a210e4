//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → Init logging/metrics → Build server → Bind
//!
//! Shutdown:
//!     SIGINT/SIGTERM or Shutdown::trigger → stop accepting → drain → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
