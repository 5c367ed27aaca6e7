//! Discovery Naming - dynamic service announcements
//!
//! This crate provides:
//! - Announcement and service models
//! - The JSON codec for a node's service list
//! - [`ReplicatedDynamicStore`], announcements written through the replicated store

pub mod codec;
pub mod dynamic_store;
pub mod model;

// Re-export commonly used types
pub use dynamic_store::{DynamicStore, ReplicatedDynamicStore};
pub use model::{DynamicAnnouncement, DynamicServiceAnnouncement, NodeId, Service};
