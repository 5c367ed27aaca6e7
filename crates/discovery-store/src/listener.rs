//! Change notification hook
//!
//! The replication transport registers an [`UpdateListener`] on the local
//! store to relay resolved entries to other replicas.
//!
//! The listener runs synchronously on the writer's thread, after the new entry
//! is visible and before `put` returns. A slow listener slows every writer on
//! the store. Implementations that talk to the network should bound their own
//! latency. Notifications are never deferred to another task: a relay sees each
//! replacement on the thread that committed it.

use crate::entry::Entry;

/// Callback invoked when a `put` replaces an existing entry
pub trait UpdateListener: Send + Sync {
    /// Called with the displaced entry and the entry that replaced it.
    /// Not called for the first insert of a key, nor for deletes.
    fn notify_update(&self, old: &Entry, new: &Entry);
}

impl<F> UpdateListener for F
where
    F: Fn(&Entry, &Entry) + Send + Sync,
{
    fn notify_update(&self, old: &Entry, new: &Entry) {
        self(old, new)
    }
}
