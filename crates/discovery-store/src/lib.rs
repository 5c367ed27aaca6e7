//! Discovery Store - replicated local store for service announcements
//!
//! This crate provides:
//! - [`Entry`], the immutable stored record
//! - [`InMemoryStore`], the concurrent last-writer-wins local store
//! - [`UpdateListener`], the change hook that drives peer replication
//! - [`DistributedStore`] and [`ReplicatedStore`], the facade writers go through
//! - [`ExpirationMonitor`], background eviction of expired entries
//!
//! Deletes leave no tombstone. If a delete overtakes an older put on its way
//! to a replica, that put re-creates the key when it arrives later.

pub mod clock;
pub mod distributed;
pub mod entry;
pub mod expiration;
pub mod listener;
pub mod local;

pub use clock::WriteClock;
pub use distributed::{
    DistributedStore, PeerFanout, RemoteStore, ReplicatedStore, ReplicationListener,
};
pub use entry::Entry;
pub use expiration::ExpirationMonitor;
pub use listener::UpdateListener;
pub use local::{InMemoryStore, LocalStore, PutOutcome};
