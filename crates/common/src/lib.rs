//! Reelsmith Common Utilities
//!
//! Shared infrastructure for all Reelsmith crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading
//! - External process helpers

pub mod config;
pub mod error;
pub mod logging;
pub mod process;

pub use config::*;
pub use error::*;
