//! Discovery Server - process wiring for the replicated announcement store
//!
//! This crate provides:
//! - Configuration loading (file, environment, command line)
//! - Logging bootstrap
//! - Assembly of the store stack and its background tasks

pub mod config;
pub mod startup;

pub use config::{Cli, Configuration};
pub use startup::DiscoveryServer;
