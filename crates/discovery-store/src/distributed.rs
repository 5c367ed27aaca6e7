//! Distributed store facade
//!
//! [`DistributedStore`] is what the announcement layer writes through. The
//! in-process implementation, [`ReplicatedStore`], stamps each write with a
//! [`WriteClock`] timestamp, applies it to the local store, and hands the
//! resolved entry to a [`RemoteStore`], the outbound edge of the replication
//! transport. How the transport ships entries between replicas is not this
//! crate's concern; on the receiving side it calls the peer's
//! [`LocalStore::put`]/[`LocalStore::delete`] directly.
//!
//! Each local write leaves the replica exactly once. A relayed facade
//! ([`ReplicatedStore::relayed`]) forwards fresh inserts and deletes itself and
//! leaves replacements to the store's [`ReplicationListener`], which also
//! relays replacements that arrive from peers.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, warn};

use discovery_common::{Result, current_timestamp_ms};

use crate::{
    clock::WriteClock,
    entry::Entry,
    listener::UpdateListener,
    local::{InMemoryStore, LocalStore, PutOutcome},
};

/// Replicated key/value facade keyed by raw bytes
pub trait DistributedStore: Send + Sync {
    /// Write `value` under `key` with the given max age. Returns whether the
    /// local replica's visible entry changed.
    fn put(&self, key: Bytes, value: Bytes, max_age: Duration) -> Result<bool>;

    /// Remove `key` as of now. Returns whether the local replica removed an entry.
    fn delete(&self, key: Bytes) -> Result<bool>;

    /// Every live entry on the local replica
    fn get_all(&self) -> Vec<Arc<Entry>>;
}

/// Outbound side of the replication transport
///
/// Called synchronously from the writer. Implementations must not block for
/// long; failures are theirs to log and retry.
pub trait RemoteStore: Send + Sync {
    fn put(&self, entry: &Entry);

    fn delete(&self, key: &[u8], timestamp: i64);
}

/// [`DistributedStore`] backed by a local store and an optional remote
pub struct ReplicatedStore {
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    forward_replacements: bool,
    clock: WriteClock,
}

impl ReplicatedStore {
    /// Facade for a single replica with nothing to propagate to
    pub fn standalone(local: Arc<dyn LocalStore>) -> Self {
        Self {
            local,
            remote: None,
            forward_replacements: false,
            clock: WriteClock::new(),
        }
    }

    /// Facade that forwards every local change to `remote`. The local store
    /// must not also relay to `remote` through a listener.
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            local,
            remote: Some(remote),
            forward_replacements: true,
            clock: WriteClock::new(),
        }
    }

    /// Facade over a store that relays its replacements to `remote` through a
    /// [`ReplicationListener`]. Installs that listener, replacing any other.
    pub fn relayed(local: Arc<InMemoryStore>, remote: Arc<dyn RemoteStore>) -> Self {
        local.set_update_listener(Arc::new(ReplicationListener::new(remote.clone())));
        Self {
            local,
            remote: Some(remote),
            forward_replacements: false,
            clock: WriteClock::new(),
        }
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Next write timestamp for `key`, strictly above whatever the replica holds
    fn stamp(&self, key: &[u8]) -> Result<i64> {
        if let Some(stored) = self.local.get(key)? {
            self.clock.observe(stored.timestamp());
        }
        Ok(self.clock.tick())
    }

    fn forwards(&self, outcome: PutOutcome) -> bool {
        match outcome {
            PutOutcome::Inserted => true,
            PutOutcome::Replaced => self.forward_replacements,
            PutOutcome::Rejected => false,
        }
    }
}

impl DistributedStore for ReplicatedStore {
    fn put(&self, key: Bytes, value: Bytes, max_age: Duration) -> Result<bool> {
        let timestamp = self.stamp(&key)?;
        let entry = Entry::new(key, value, timestamp, Some(max_age));

        let outcome = self.local.apply(entry.clone())?;
        if self.forwards(outcome)
            && let Some(remote) = &self.remote
        {
            remote.put(&entry);
        }
        Ok(outcome.changed())
    }

    fn delete(&self, key: Bytes) -> Result<bool> {
        let timestamp = self.stamp(&key)?;

        let removed = self.local.delete(&key, timestamp)?;
        // Peers may hold the key even when this replica does not.
        if let Some(remote) = &self.remote {
            remote.delete(&key, timestamp);
        }
        Ok(removed)
    }

    fn get_all(&self) -> Vec<Arc<Entry>> {
        let now = current_timestamp_ms();
        self.local
            .get_all()
            .into_iter()
            .filter(|entry| !entry.is_expired(now))
            .collect()
    }
}

/// Update listener that relays every winning replacement to a [`RemoteStore`]
pub struct ReplicationListener {
    remote: Arc<dyn RemoteStore>,
}

impl ReplicationListener {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

impl UpdateListener for ReplicationListener {
    fn notify_update(&self, _old: &Entry, new: &Entry) {
        self.remote.put(new);
    }
}

/// [`RemoteStore`] that applies entries straight to in-process peer stores
///
/// Peers resolve each delivery with their own conflict rules, so a relay loop
/// between peers stops as soon as every peer holds the winning entry.
#[derive(Default)]
pub struct PeerFanout {
    peers: RwLock<Vec<Arc<dyn LocalStore>>>,
}

impl PeerFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, peer: Arc<dyn LocalStore>) {
        self.peers.write().push(peer);
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn LocalStore>> {
        self.peers.read().clone()
    }
}

impl RemoteStore for PeerFanout {
    fn put(&self, entry: &Entry) {
        for peer in self.snapshot() {
            match peer.put(entry.clone()) {
                Ok(changed) => debug!(
                    "Replicated entry: key={:?}, timestamp={}, changed={}",
                    entry.key(),
                    entry.timestamp(),
                    changed
                ),
                Err(e) => warn!("Failed to replicate entry {:?}: {}", entry.key(), e),
            }
        }
    }

    fn delete(&self, key: &[u8], timestamp: i64) {
        for peer in self.snapshot() {
            if let Err(e) = peer.delete(key, timestamp) {
                warn!(
                    "Failed to replicate delete of {}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
            }
        }
    }
}
