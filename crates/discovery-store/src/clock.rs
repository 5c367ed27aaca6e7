//! Timestamp source for locally originated writes
//!
//! Timestamps are wall-clock milliseconds, bumped by one when the wall clock
//! has not advanced past the last issued value. Two writes from the same
//! process therefore never tie, and a wall clock that steps backwards cannot
//! make a later local write lose to an earlier one. Timestamps already seen on
//! the replica are fed back through [`WriteClock::observe`], so a peer whose
//! clock runs ahead cannot shadow this replica's later writes.

use std::sync::atomic::{AtomicI64, Ordering};

use discovery_common::current_timestamp_ms;

#[derive(Debug, Default)]
pub struct WriteClock {
    last: AtomicI64,
}

impl WriteClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next write timestamp
    pub fn tick(&self) -> i64 {
        self.tick_at(current_timestamp_ms())
    }

    /// Raise the floor for subsequent ticks to `timestamp`
    pub fn observe(&self, timestamp: i64) {
        self.last.fetch_max(timestamp, Ordering::SeqCst);
    }

    /// Issue a timestamp no lower than `now_ms` and greater than any issued before
    pub fn tick_at(&self, now_ms: i64) -> i64 {
        loop {
            let current = self.last.load(Ordering::SeqCst);
            let next = now_ms.max(current.saturating_add(1));
            if self
                .last
                .compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }
}
