//! Stored record type
//!
//! An [`Entry`] is immutable once built. Updating a key always installs a new
//! `Entry`; the store never mutates fields in place.

use std::time::Duration;

use bytes::Bytes;
use discovery_common::duration_to_ms;

/// A stored (key, value, timestamp, max age) record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    key: Bytes,
    value: Bytes,
    timestamp: i64,
    max_age: Option<Duration>,
}

impl Entry {
    /// Create an entry. A `None` max age means "use the store default".
    pub fn new(
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
        timestamp: i64,
        max_age: Option<Duration>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            timestamp,
            max_age,
        }
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Writer's wall-clock milliseconds, used only to resolve conflicts
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Copy of this entry carrying `max_age`. Key, value and timestamp are shared.
    pub fn with_max_age(&self, max_age: Duration) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            timestamp: self.timestamp,
            max_age: Some(max_age),
        }
    }

    /// Whether this entry's timestamp is strictly greater than `timestamp`
    pub fn is_newer_than(&self, timestamp: i64) -> bool {
        self.timestamp > timestamp
    }

    /// Epoch millis at which the entry expires, if it carries a max age
    pub fn expires_at(&self) -> Option<i64> {
        self.max_age
            .map(|max_age| self.timestamp.saturating_add(duration_to_ms(max_age)))
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::new(&b"node-1"[..], &b"[]"[..], 100, None);
        assert_eq!(entry.key().as_ref(), b"node-1");
        assert_eq!(entry.value().as_ref(), b"[]");
        assert_eq!(entry.timestamp(), 100);
        assert!(entry.max_age().is_none());
        assert!(entry.expires_at().is_none());
    }

    #[test]
    fn test_with_max_age_keeps_fields() {
        let entry = Entry::new(&b"k"[..], &b"v"[..], 42, None);
        let aged = entry.with_max_age(Duration::from_secs(30));

        assert_eq!(aged.key(), entry.key());
        assert_eq!(aged.value(), entry.value());
        assert_eq!(aged.timestamp(), 42);
        assert_eq!(aged.max_age(), Some(Duration::from_secs(30)));
        assert_ne!(aged, entry);
    }

    #[test]
    fn test_is_newer_than_is_strict() {
        let entry = Entry::new(&b"k"[..], &b"v"[..], 10, None);
        assert!(entry.is_newer_than(9));
        assert!(!entry.is_newer_than(10));
        assert!(!entry.is_newer_than(11));
    }

    #[test]
    fn test_expiry() {
        let entry = Entry::new(&b"k"[..], &b"v"[..], 1_000, Some(Duration::from_millis(500)));
        assert_eq!(entry.expires_at(), Some(1_500));
        assert!(!entry.is_expired(1_499));
        assert!(entry.is_expired(1_500));
        assert!(entry.is_expired(2_000));
    }

    #[test]
    fn test_no_max_age_never_expires() {
        let entry = Entry::new(&b"k"[..], &b"v"[..], 0, None);
        assert!(!entry.is_expired(i64::MAX));
    }

    #[test]
    fn test_huge_max_age_does_not_overflow() {
        let entry = Entry::new(&b"k"[..], &b"v"[..], i64::MAX - 1, Some(Duration::MAX));
        assert_eq!(entry.expires_at(), Some(i64::MAX));
        assert!(!entry.is_expired(i64::MAX - 1));
    }
}
