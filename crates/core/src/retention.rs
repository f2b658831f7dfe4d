//! Diary retention policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default retention window for diary entries, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 16;

/// Retention policy for the visit diary.
///
/// Age is measured in whole days since the Unix epoch, so an entry
/// expires at a day boundary rather than a rolling 24h offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Days of history to keep. Zero or negative retains nothing.
    pub retention_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl RetentionPolicy {
    pub fn new(retention_days: i64) -> Self {
        Self { retention_days }
    }

    /// True if an entry with the given arrival must be purged as of `today`.
    pub fn is_expired(&self, arrival: DateTime<Utc>, today: DateTime<Utc>) -> bool {
        if self.retention_days <= 0 {
            return true;
        }
        days_since_epoch(arrival) < days_since_epoch(today) - self.retention_days
    }
}

/// Whole days since the Unix epoch (floor division, stable across
/// negative timestamps).
fn days_since_epoch(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(86_400)
}
