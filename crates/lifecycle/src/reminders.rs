//! Reminder coordinator seam.

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

use checkin_core::ActiveSession;

/// Platform reminder/notification coordinator.
///
/// All calls are fire-and-forget: scheduling failures stay on the
/// platform side and are never surfaced to lifecycle callers.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Cancels every pending reminder for the current session.
    async fn cancel_all(&self);

    /// Schedules a reminder `offset` after the session's arrival.
    async fn schedule(&self, session: &ActiveSession, offset: Duration);

    /// Tells the platform a checkout completed (e.g. to clear a
    /// persistent "checked in" notification).
    async fn checkout_happened(&self);
}

/// Scheduler that only writes structured log records.
///
/// The real notification system lives in the platform layer; the
/// daemon and tests run with this sink.
#[derive(Debug, Default, Clone)]
pub struct LogReminderScheduler;

impl LogReminderScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReminderScheduler for LogReminderScheduler {
    async fn cancel_all(&self) {
        info!("Cancelling pending check-in reminders");
    }

    async fn schedule(&self, session: &ActiveSession, offset: Duration) {
        info!(
            venue = session.venue.id(),
            due_at = %(session.arrival + offset),
            "Scheduling check-in reminder"
        );
    }

    async fn checkout_happened(&self) {
        info!("Checkout completed, clearing check-in notification");
    }
}
