//! Proposal Core - process configuration, logging and error context
//!
//! Everything in here is read once at startup and shared read-only afterwards.

pub mod config;
pub mod error;
pub mod logging;

pub use self::config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;
