//! Test fixtures for driving a fully wired engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;

use checkin_core::{VenueDescriptor, VenueType};
use checkin_engine::{Config, Engine};
use checkin_storage::JsonFileStore;

use crate::mocks::{MockRegistrationClient, RecordingReminderScheduler};

/// Fixed reference arrival time.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
}

/// A plain restaurant venue.
pub fn venue(id: &str) -> VenueDescriptor {
    VenueDescriptor::new(id, "12 Harbour St", VenueType::Restaurant).unwrap()
}

/// A venue carrying the full set of policy parameters.
pub fn venue_with_policy(id: &str) -> VenueDescriptor {
    venue(id)
        .with_reminder_offsets(vec![1800, 3600])
        .unwrap()
        .with_auto_checkout_after(Duration::hours(4))
        .unwrap()
        .with_checkout_warning_after(Duration::hours(2))
        .unwrap()
}

/// An engine wired over a tempdir file store and the in-memory mocks.
pub struct TestEngine {
    pub engine: Engine,
    pub registration: Arc<MockRegistrationClient>,
    pub reminders: Arc<RecordingReminderScheduler>,
    _dir: TempDir,
}

impl TestEngine {
    pub async fn open() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let registration = Arc::new(MockRegistrationClient::new());
        let reminders = Arc::new(RecordingReminderScheduler::new());
        let engine = Self::wire(&dir, registration.clone(), reminders.clone()).await;
        Self {
            engine,
            registration,
            reminders,
            _dir: dir,
        }
    }

    /// Re-wires a fresh engine over the same store file, as an app
    /// relaunch would.
    pub async fn reopen(self) -> Self {
        let engine =
            Self::wire(&self._dir, self.registration.clone(), self.reminders.clone()).await;
        Self { engine, ..self }
    }

    async fn wire(
        dir: &TempDir,
        registration: Arc<MockRegistrationClient>,
        reminders: Arc<RecordingReminderScheduler>,
    ) -> Engine {
        let store_path = dir.path().join("checkin.json");
        let config = Config {
            store_path: store_path.to_string_lossy().into_owned(),
            ..Config::default()
        };
        let store = Arc::new(JsonFileStore::open(&store_path).expect("open store"));
        Engine::with_collaborators(config, store, registration, reminders)
            .await
            .expect("wire engine")
    }
}
