//! Expiration monitor - background task that evicts entries past their max age
//!
//! Without it, max age is advisory: expired entries stay in the local store
//! until overwritten or deleted, and only the facade's reads hide them.

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use discovery_common::current_timestamp_ms;

use crate::local::InMemoryStore;

/// Shortest period between sweeps
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically sweeps a store and removes expired entries
pub struct ExpirationMonitor {
    store: Arc<InMemoryStore>,
    interval: Duration,
}

impl ExpirationMonitor {
    /// Intervals below [`MIN_SWEEP_INTERVAL`] are raised to it
    pub fn new(store: Arc<InMemoryStore>, interval: Duration) -> Self {
        if interval < MIN_SWEEP_INTERVAL {
            warn!(
                "Expiration interval {:?} too short, using {:?}",
                interval, MIN_SWEEP_INTERVAL
            );
        }
        Self {
            store,
            interval: interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the sweep loop until `shutdown` fires or its sender is dropped
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "Expiration monitor started with interval: {}ms",
            self.interval.as_millis()
        );
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    info!("Expiration monitor stopped");
                    return;
                }
            }
        }
    }

    /// Run one eviction pass. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let evicted = self.store.evict_expired(current_timestamp_ms());
        if evicted > 0 {
            debug!(
                "Evicted {} expired entries, {} remaining",
                evicted,
                self.store.len()
            );
        }
        evicted
    }
}
