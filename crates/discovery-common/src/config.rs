//! Store-level configuration
//!
//! Values are supplied once at construction time. Loading them from files or
//! the environment is the server crate's job.

use std::time::Duration;

/// Default maximum age applied to entries written without one
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

/// Default period between expiration sweeps
pub const DEFAULT_EXPIRATION_INTERVAL: Duration = Duration::from_secs(5);

/// Discovery store configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Max age stamped on announcements and used as the store's default TTL
    pub max_age: Duration,
    /// Interval between background eviction passes
    pub expiration_interval: Duration,
    /// Whether the background eviction pass runs at all
    pub expiration_enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            expiration_interval: DEFAULT_EXPIRATION_INTERVAL,
            expiration_enabled: true,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Max age in whole milliseconds, saturating at `i64::MAX`
    pub fn max_age_ms(&self) -> i64 {
        crate::utils::duration_to_ms(self.max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(30));
        assert_eq!(config.expiration_interval, Duration::from_secs(5));
        assert!(config.expiration_enabled);
        assert_eq!(config.max_age_ms(), 30_000);
    }

    #[test]
    fn test_max_age_ms_saturates() {
        let config = DiscoveryConfig::default().with_max_age(Duration::MAX);
        assert_eq!(config.max_age_ms(), i64::MAX);
    }
}
