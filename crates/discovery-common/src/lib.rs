//! Discovery Common - Shared types and utilities
//!
//! This crate provides the foundational pieces used by the store crates:
//! - Error type and `Result` alias
//! - Store configuration
//! - Time helpers

pub mod config;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use config::DiscoveryConfig;
pub use error::{DiscoveryError, Result};
pub use utils::{current_timestamp_ms, duration_to_ms};
