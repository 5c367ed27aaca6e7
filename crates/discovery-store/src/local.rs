//! In-memory local store with last-writer-wins conflict resolution
//!
//! Every replica answers reads from its own [`InMemoryStore`]. Writes, whether
//! originated locally or delivered by the replication transport, go through the
//! same `put`/`delete` path so all replicas resolve conflicts identically:
//!
//! - an incoming entry replaces the stored one iff its timestamp is strictly
//!   greater; ties keep the stored entry
//! - a delete at time `t` removes the stored entry iff that entry's timestamp
//!   is not greater than `t`
//!
//! The map is a sharded [`DashMap`] holding `Arc<Entry>`. Writers never hold a
//! shard lock while resolving a conflict or notifying the listener. A write is
//! a read / resolve / compare-and-swap cycle against the exact `Arc` observed,
//! retried from a fresh read when another writer got there first.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use dashmap::{DashMap, mapref::entry::Entry as MapEntry};
use parking_lot::RwLock;
use tracing::{debug, trace};

use discovery_common::{DiscoveryConfig, DiscoveryError, Result};

use crate::{entry::Entry, listener::UpdateListener};

/// What a put did to the key's visible entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was absent
    Inserted,
    /// The incoming entry won against the stored one
    Replaced,
    /// The stored entry is at least as new; nothing changed
    Rejected,
}

impl PutOutcome {
    pub fn changed(self) -> bool {
        self != PutOutcome::Rejected
    }
}

/// Capability set shared by the in-memory store and anything standing in for it
pub trait LocalStore: Send + Sync {
    /// Insert or conflict-resolve `entry`, reporting how the key changed
    fn apply(&self, entry: Entry) -> Result<PutOutcome>;

    /// Insert or conflict-resolve `entry`. Returns whether the visible entry changed.
    fn put(&self, entry: Entry) -> Result<bool> {
        self.apply(entry).map(PutOutcome::changed)
    }

    /// Look up the entry for `key`
    fn get(&self, key: &[u8]) -> Result<Option<Arc<Entry>>>;

    /// Remove the entry for `key` unless it is strictly newer than `timestamp`.
    /// Returns whether an entry was removed.
    fn delete(&self, key: &[u8], timestamp: i64) -> Result<bool>;

    /// Every stored entry, expired or not, in no particular order
    fn get_all(&self) -> Vec<Arc<Entry>>;
}

/// Concurrent last-writer-wins map from key bytes to [`Entry`]
pub struct InMemoryStore {
    map: DashMap<Bytes, Arc<Entry>>,
    max_age: Option<Duration>,
    update_listener: RwLock<Option<Arc<dyn UpdateListener>>>,
}

impl InMemoryStore {
    /// Store that stamps `config.max_age` on entries written without one
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self::with_max_age(Some(config.max_age))
    }

    /// Store with an explicit default max age; `None` leaves entries as written
    pub fn with_max_age(max_age: Option<Duration>) -> Self {
        Self {
            map: DashMap::new(),
            max_age,
            update_listener: RwLock::new(None),
        }
    }

    /// Register the update listener, replacing any previous one
    pub fn set_update_listener(&self, listener: Arc<dyn UpdateListener>) {
        *self.update_listener.write() = Some(listener);
    }

    pub fn clear_update_listener(&self) {
        *self.update_listener.write() = None;
    }

    pub fn default_max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove every entry that is expired at `now_ms`. Returns the number removed.
    ///
    /// Each removal is conditional on the slot still holding the expired entry,
    /// so a fresh write racing with the sweep survives it.
    pub fn evict_expired(&self, now_ms: i64) -> usize {
        let expired: Vec<Arc<Entry>> = self
            .map
            .iter()
            .filter(|item| item.value().is_expired(now_ms))
            .map(|item| item.value().clone())
            .collect();

        let mut evicted = 0;
        for entry in expired {
            if self
                .map
                .remove_if(entry.key(), |_, current| Arc::ptr_eq(current, &entry))
                .is_some()
            {
                trace!(
                    "Evicted expired entry: key={:?}, timestamp={}",
                    entry.key(),
                    entry.timestamp()
                );
                evicted += 1;
            }
        }
        evicted
    }

    fn normalize(&self, entry: Entry) -> Entry {
        match self.max_age {
            Some(max_age) if entry.max_age().is_none() => entry.with_max_age(max_age),
            _ => entry,
        }
    }

    /// Swap `old` for `new` only if the slot still holds exactly `old`
    fn replace(&self, old: &Arc<Entry>, new: &Arc<Entry>) -> bool {
        match self.map.get_mut(old.key()) {
            Some(mut current) if Arc::ptr_eq(current.value(), old) => {
                *current.value_mut() = new.clone();
                true
            }
            _ => false,
        }
    }

    fn notify_update(&self, old: &Entry, new: &Entry) {
        let listener = self.update_listener.read().clone();
        if let Some(listener) = listener {
            listener.notify_update(old, new);
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_max_age(None)
    }
}

impl LocalStore for InMemoryStore {
    fn apply(&self, entry: Entry) -> Result<PutOutcome> {
        check_key(entry.key())?;

        let entry = Arc::new(self.normalize(entry));

        loop {
            let old = match self.map.entry(entry.key().clone()) {
                MapEntry::Vacant(slot) => {
                    slot.insert(entry.clone());
                    return Ok(PutOutcome::Inserted);
                }
                MapEntry::Occupied(slot) => slot.get().clone(),
            };

            if !entry.is_newer_than(old.timestamp()) {
                debug!(
                    "Rejected stale write: key={:?}, stored={}, incoming={}",
                    entry.key(),
                    old.timestamp(),
                    entry.timestamp()
                );
                return Ok(PutOutcome::Rejected);
            }

            if self.replace(&old, &entry) {
                self.notify_update(&old, &entry);
                return Ok(PutOutcome::Replaced);
            }
        }
    }

    fn get(&self, key: &[u8]) -> Result<Option<Arc<Entry>>> {
        check_key(key)?;

        Ok(self.map.get(key).map(|item| item.value().clone()))
    }

    fn delete(&self, key: &[u8], timestamp: i64) -> Result<bool> {
        check_key(key)?;

        loop {
            let old = match self.map.get(key) {
                Some(item) => item.value().clone(),
                None => return Ok(false),
            };

            if old.is_newer_than(timestamp) {
                debug!(
                    "Rejected stale delete: key={}, stored={}, delete={}",
                    String::from_utf8_lossy(key),
                    old.timestamp(),
                    timestamp
                );
                return Ok(false);
            }

            if self
                .map
                .remove_if(key, |_, current| Arc::ptr_eq(current, &old))
                .is_some()
            {
                return Ok(true);
            }
        }
    }

    fn get_all(&self) -> Vec<Arc<Entry>> {
        self.map.iter().map(|item| item.value().clone()).collect()
    }
}

fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(DiscoveryError::illegal_argument("key is empty"));
    }
    Ok(())
}
