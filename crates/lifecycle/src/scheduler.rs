//! Background scheduler for lifecycle housekeeping.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

use checkin_core::RetentionPolicy;
use checkin_telemetry::metrics;
use chrono::Utc;

use crate::manager::CheckInManager;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Session length ceiling enforced by the auto-checkout loop.
    pub auto_checkout_after: chrono::Duration,
    /// Auto-checkout poll interval.
    pub auto_checkout_poll_interval: Duration,
    /// Diary retention policy.
    pub retention: RetentionPolicy,
    /// Retention sweep interval.
    pub retention_interval: Duration,
    /// Metrics snapshot log interval.
    pub metrics_log_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_checkout_after: chrono::Duration::hours(checkin_core::MAX_SESSION_HOURS),
            auto_checkout_poll_interval: Duration::from_secs(60),
            retention: RetentionPolicy::default(),
            retention_interval: Duration::from_secs(3600), // 1 hour
            metrics_log_interval: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Background housekeeping loops over one [`CheckInManager`].
pub struct LifecycleScheduler {
    config: SchedulerConfig,
    manager: Arc<CheckInManager>,
}

impl LifecycleScheduler {
    pub fn new(config: SchedulerConfig, manager: Arc<CheckInManager>) -> Self {
        Self { config, manager }
    }

    /// Starts all housekeeping loops.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_auto_checkout_loop().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_retention_loop().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_logger().await;
        }));

        info!("Lifecycle housekeeping loops started");
        handles
    }

    async fn run_auto_checkout_loop(&self) {
        let mut ticker = interval(self.config.auto_checkout_poll_interval);

        loop {
            ticker.tick().await;

            match self
                .manager
                .maybe_auto_checkout(Utc::now(), self.config.auto_checkout_after)
                .await
            {
                Ok(Some(entry)) => {
                    info!(id = %entry.id(), "Auto-checkout recorded");
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Auto-checkout failed: {}", e);
                }
            }
        }
    }

    async fn run_retention_loop(&self) {
        let mut ticker = interval(self.config.retention_interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self
                .manager
                .retention_sweep(self.config.retention, Utc::now())
                .await
            {
                error!("Retention sweep failed: {}", e);
            }
        }
    }

    async fn run_metrics_logger(&self) {
        let mut ticker = interval(self.config.metrics_log_interval);

        loop {
            ticker.tick().await;

            let snapshot = metrics().snapshot();
            debug!(
                check_ins = snapshot.check_ins_started,
                check_outs = snapshot.check_outs_completed,
                auto_check_outs = snapshot.auto_check_outs,
                registrations_failed = snapshot.registrations_failed,
                purged = snapshot.entries_purged,
                "Lifecycle metrics"
            );
        }
    }
}
