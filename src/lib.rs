//! Venue check-in session and diary lifecycle engine.
//!
//! Library surface for embedding: configuration, component wiring, and
//! re-exports of the crates an embedder needs. The state machine itself
//! lives in [`checkin_lifecycle`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use checkin_core::{DEFAULT_RETENTION_DAYS, MAX_SESSION_HOURS};
use checkin_storage::SlotStore;

pub use checkin_core::{
    ActiveSession, CheckInId, CheckInPhase, DiaryEntry, Error, RegistrationError, Result,
    RetentionPolicy, VenueDescriptor, VenueType,
};
pub use checkin_lifecycle::{
    ChangeEvent, CheckInManager, LifecycleScheduler, LogReminderScheduler, ReminderScheduler,
    SchedulerConfig,
};
pub use checkin_registration::{HttpRegistrationClient, RegistrationClient, RegistrationConfig};
pub use checkin_storage::{JsonFileStore, KeyValueStore, MemoryStore};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the durable slot store.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Session length ceiling before forced checkout, in hours.
    #[serde(default = "default_auto_checkout_hours")]
    pub auto_checkout_hours: i64,

    /// Diary retention window, in days.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Auto-checkout poll interval, in seconds.
    #[serde(default = "default_auto_checkout_poll_secs")]
    pub auto_checkout_poll_secs: u64,

    /// Retention sweep interval, in seconds.
    #[serde(default = "default_retention_sweep_secs")]
    pub retention_sweep_secs: u64,
}

fn default_store_path() -> String {
    "data/checkin.json".to_string()
}

fn default_auto_checkout_hours() -> i64 {
    MAX_SESSION_HOURS
}

fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

fn default_auto_checkout_poll_secs() -> u64 {
    60
}

fn default_retention_sweep_secs() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            registration: RegistrationConfig::default(),
            auto_checkout_hours: default_auto_checkout_hours(),
            retention_days: default_retention_days(),
            auto_checkout_poll_secs: default_auto_checkout_poll_secs(),
            retention_sweep_secs: default_retention_sweep_secs(),
        }
    }
}

impl Config {
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.retention_days)
    }

    fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            auto_checkout_after: chrono::Duration::hours(self.auto_checkout_hours),
            auto_checkout_poll_interval: std::time::Duration::from_secs(
                self.auto_checkout_poll_secs,
            ),
            retention: self.retention_policy(),
            retention_interval: std::time::Duration::from_secs(self.retention_sweep_secs),
            ..SchedulerConfig::default()
        }
    }
}

/// A wired check-in engine: manager plus its housekeeping scheduler.
pub struct Engine {
    config: Config,
    manager: Arc<CheckInManager>,
}

impl Engine {
    /// Opens the engine on the configured file store with the HTTP
    /// registration client and the logging reminder sink.
    pub async fn open(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.store_path)?);
        let registration: Arc<dyn RegistrationClient> =
            Arc::new(HttpRegistrationClient::new(config.registration.clone()));
        let reminders: Arc<dyn ReminderScheduler> = Arc::new(LogReminderScheduler::new());
        Self::with_collaborators(config, store, registration, reminders).await
    }

    /// Wires the engine over caller-supplied collaborators (embedding
    /// hosts supply their platform store and notification bridge here;
    /// tests supply mocks).
    pub async fn with_collaborators(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        registration: Arc<dyn RegistrationClient>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Result<Self> {
        let manager = Arc::new(CheckInManager::new(
            SlotStore::new(store),
            registration,
            reminders,
        ));

        if manager.recover_interrupted_checkout().await? {
            info!("Recovered from an interrupted checkout");
        }

        Ok(Self { config, manager })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> Arc<CheckInManager> {
        self.manager.clone()
    }

    /// Runs the retention sweep once, as of now.
    pub async fn sweep_now(&self) -> Result<usize> {
        self.manager
            .retention_sweep(self.config.retention_policy(), chrono::Utc::now())
            .await
    }

    /// Starts the background housekeeping loops.
    pub fn start_scheduler(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let scheduler = Arc::new(LifecycleScheduler::new(
            self.config.scheduler_config(),
            self.manager.clone(),
        ));
        scheduler.start()
    }
}
