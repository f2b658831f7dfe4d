//! Internal metrics collection.
//!
//! In-memory lifecycle counters; the background scheduler logs a
//! snapshot periodically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Collected metrics for the check-in lifecycle.
#[derive(Debug, Default)]
pub struct Metrics {
    // Session lifecycle
    pub check_ins_started: Counter,
    pub check_outs_completed: Counter,
    pub auto_check_outs: Counter,
    pub registrations_failed: Counter,

    // Diary maintenance
    pub diary_edits: Counter,
    pub entries_hidden: Counter,
    pub entries_purged: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub check_ins_started: u64,
    pub check_outs_completed: u64,
    pub auto_check_outs: u64,
    pub registrations_failed: u64,
    pub diary_edits: u64,
    pub entries_hidden: u64,
    pub entries_purged: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            check_ins_started: self.check_ins_started.get(),
            check_outs_completed: self.check_outs_completed.get(),
            auto_check_outs: self.auto_check_outs.get(),
            registrations_failed: self.registrations_failed.get(),
            diary_edits: self.diary_edits.get(),
            entries_hidden: self.entries_hidden.get(),
            entries_purged: self.entries_purged.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
