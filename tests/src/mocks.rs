//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use checkin_core::{ActiveSession, CheckInId, RegistrationError, VenueDescriptor};
use checkin_lifecycle::ReminderScheduler;
use checkin_registration::RegistrationClient;

/// One captured `register` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredWindow {
    pub venue_id: String,
    pub arrival: DateTime<Utc>,
    pub departure: DateTime<Utc>,
}

/// Mock registration client that hands out sequential identifiers and
/// captures every call, so tests can verify the exact windows that
/// would reach the registration service without any network.
#[derive(Clone, Default)]
pub struct MockRegistrationClient {
    next_id: Arc<Mutex<u64>>,
    registered: Arc<Mutex<Vec<RegisteredWindow>>>,
    updated: Arc<Mutex<Vec<(CheckInId, DateTime<Utc>, DateTime<Utc>)>>>,
    fail_with: Arc<Mutex<Option<RegistrationError>>>,
}

impl MockRegistrationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent calls fail with `err`.
    pub fn fail_with(&self, err: RegistrationError) {
        *self.fail_with.lock() = Some(err);
    }

    /// Clears the failure mode.
    pub fn succeed(&self) {
        *self.fail_with.lock() = None;
    }

    /// All captured `register` calls.
    pub fn registered(&self) -> Vec<RegisteredWindow> {
        self.registered.lock().clone()
    }

    /// All captured `update` calls.
    pub fn updated(&self) -> Vec<(CheckInId, DateTime<Utc>, DateTime<Utc>)> {
        self.updated.lock().clone()
    }
}

#[async_trait]
impl RegistrationClient for MockRegistrationClient {
    async fn register(
        &self,
        venue: &VenueDescriptor,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Result<CheckInId, RegistrationError> {
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }

        self.registered.lock().push(RegisteredWindow {
            venue_id: venue.id().to_string(),
            arrival,
            departure,
        });

        let mut next = self.next_id.lock();
        *next += 1;
        Ok(CheckInId::new(format!("id-{}", *next)))
    }

    async fn update(
        &self,
        id: &CheckInId,
        _venue: &VenueDescriptor,
        new_arrival: DateTime<Utc>,
        new_departure: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }

        self.updated
            .lock()
            .push((id.clone(), new_arrival, new_departure));
        Ok(())
    }
}

/// Reminder scheduler that records every hook invocation.
#[derive(Clone, Default)]
pub struct RecordingReminderScheduler {
    scheduled: Arc<Mutex<Vec<(String, i64)>>>,
    cancellations: Arc<Mutex<u64>>,
    checkout_notices: Arc<Mutex<u64>>,
}

impl RecordingReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduled reminders as (venue id, offset seconds).
    pub fn scheduled(&self) -> Vec<(String, i64)> {
        self.scheduled.lock().clone()
    }

    pub fn cancellations(&self) -> u64 {
        *self.cancellations.lock()
    }

    pub fn checkout_notices(&self) -> u64 {
        *self.checkout_notices.lock()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingReminderScheduler {
    async fn cancel_all(&self) {
        *self.cancellations.lock() += 1;
    }

    async fn schedule(&self, session: &ActiveSession, offset: Duration) {
        self.scheduled
            .lock()
            .push((session.venue.id().to_string(), offset.num_seconds()));
    }

    async fn checkout_happened(&self) {
        *self.checkout_notices.lock() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::VenueType;

    #[tokio::test]
    async fn test_mock_registration_hands_out_sequential_ids() {
        let mock = MockRegistrationClient::new();
        let venue = VenueDescriptor::new("venue-1", "Addr", VenueType::Other).unwrap();
        let now = Utc::now();

        let first = mock.register(&venue, now, now).await.unwrap();
        let second = mock.register(&venue, now, now).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(mock.registered().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_registration_failure_mode() {
        let mock = MockRegistrationClient::new();
        mock.fail_with(RegistrationError::Unknown("scripted".into()));

        let venue = VenueDescriptor::new("venue-1", "Addr", VenueType::Other).unwrap();
        let now = Utc::now();
        assert!(mock.register(&venue, now, now).await.is_err());
        assert!(mock.registered().is_empty());

        mock.succeed();
        assert!(mock.register(&venue, now, now).await.is_ok());
    }
}
