//! Utility functions shared by the store crates

use std::time::Duration;

/// Current wall-clock time in epoch milliseconds
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a duration to milliseconds, saturating at `i64::MAX`
pub fn duration_to_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
