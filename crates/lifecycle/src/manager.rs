//! The check-in lifecycle state machine.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use checkin_core::{
    ActiveSession, CheckInId, CheckInPhase, DiaryEntry, Error, Result, RetentionPolicy,
    VenueDescriptor,
};
use checkin_registration::RegistrationClient;
use checkin_storage::SlotStore;
use checkin_telemetry::metrics;

use crate::events::ChangeEvent;
use crate::reminders::ReminderScheduler;

/// Buffered change events per subscriber before lagging.
const EVENT_CAPACITY: usize = 16;

/// Owner of the active-session slot and the visit diary.
///
/// All mutating operations serialize on one internal lock; the durable
/// store is the single source of truth and every read goes through it.
/// The lock is *not* held across the registration network call: the
/// persisted departure timestamp (checkout) and the entry's persisted
/// absence (edit) are what guard against re-entrancy while the call is
/// in flight.
pub struct CheckInManager {
    store: SlotStore,
    registration: Arc<dyn RegistrationClient>,
    reminders: Arc<dyn ReminderScheduler>,
    events: broadcast::Sender<ChangeEvent>,
    slot_lock: Mutex<()>,
}

impl CheckInManager {
    pub fn new(
        store: SlotStore,
        registration: Arc<dyn RegistrationClient>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            registration,
            reminders,
            events,
            slot_lock: Mutex::new(()),
        }
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Best-effort send; absent or lagged subscribers are not an error.
    fn notify(&self, event: ChangeEvent) {
        let _ = self.events.send(event);
    }

    /// Current phase of the check-in slot.
    pub async fn phase(&self) -> Result<CheckInPhase> {
        let session = self.store.active_session().await?;
        Ok(CheckInPhase::of(session.as_ref()))
    }

    /// The active session, if any.
    pub async fn active_session(&self) -> Result<Option<ActiveSession>> {
        self.store.active_session().await
    }

    /// Read-only snapshot of the diary in append order.
    pub async fn diary(&self) -> Result<Vec<DiaryEntry>> {
        self.store.diary().await
    }

    /// Starts a new session at `arrival`.
    ///
    /// Fails with [`Error::AlreadyCheckedIn`] while any session exists,
    /// including one still finalizing; the caller must check out first
    /// (or let auto-checkout run).
    pub async fn start_check_in(
        &self,
        qr_payload: impl Into<String>,
        venue: VenueDescriptor,
        arrival: DateTime<Utc>,
    ) -> Result<ActiveSession> {
        let _guard = self.slot_lock.lock().await;

        if self.store.active_session().await?.is_some() {
            return Err(Error::AlreadyCheckedIn);
        }

        let session = ActiveSession::begin(qr_payload, venue, arrival);
        self.store.put_active_session(Some(&session)).await?;
        metrics().check_ins_started.inc();
        info!(venue = session.venue.id(), arrival = %arrival, "Checked in");

        if let Some(warn_after) = session.venue.checkout_warning_after() {
            self.reminders.schedule(&session, warn_after).await;
        }

        drop(_guard);
        self.notify(ChangeEvent::SessionChanged);
        Ok(session)
    }

    /// Schedules a user-chosen reminder for the active session.
    ///
    /// Returns `false` without scheduling when idle, when checkout has
    /// already started, or when `offset` is not among the venue's
    /// offered reminder choices.
    pub async fn schedule_reminder(&self, offset: Duration) -> Result<bool> {
        let _guard = self.slot_lock.lock().await;

        let Some(session) = self.store.active_session().await? else {
            return Ok(false);
        };
        if session.is_finalizing() {
            return Ok(false);
        }
        if !session.venue.allows_reminder_offset(offset) {
            debug!(
                venue = session.venue.id(),
                offset_secs = offset.num_seconds(),
                "Reminder offset not offered by venue"
            );
            return Ok(false);
        }

        self.reminders.schedule(&session, offset).await;
        Ok(true)
    }

    /// Finalizes the active session at `departure`.
    ///
    /// Returns `Ok(None)` when there is nothing to do: no session, or a
    /// racing checkout already set the departure. On registration
    /// failure the session is cleared *without* a diary entry and the
    /// cause is returned; the visit is gone from history.
    pub async fn check_out(&self, departure: DateTime<Utc>) -> Result<Option<DiaryEntry>> {
        let session = {
            let _guard = self.slot_lock.lock().await;

            let Some(mut session) = self.store.active_session().await? else {
                return Ok(None);
            };
            if session.is_finalizing() {
                return Ok(None);
            }
            if departure < session.arrival {
                return Err(Error::InvalidTimeWindow {
                    arrival: session.arrival,
                    departure,
                });
            }

            session.departure = Some(departure);
            self.store.put_active_session(Some(&session)).await?;
            session
        };

        self.notify(ChangeEvent::SessionChanged);
        self.finalize(session, departure, false).await
    }

    /// Forces a checkout at `arrival + max_duration` once the session
    /// has outlived `max_duration` at `now`. No-op otherwise.
    pub async fn maybe_auto_checkout(
        &self,
        now: DateTime<Utc>,
        max_duration: Duration,
    ) -> Result<Option<DiaryEntry>> {
        let (session, departure) = {
            let _guard = self.slot_lock.lock().await;

            let Some(mut session) = self.store.active_session().await? else {
                return Ok(None);
            };
            if session.is_finalizing() || !session.exceeds(now, max_duration) {
                return Ok(None);
            }

            let departure = session.arrival + max_duration;
            session.departure = Some(departure);
            self.store.put_active_session(Some(&session)).await?;
            (session, departure)
        };

        info!(
            venue = session.venue.id(),
            departure = %departure,
            "Session exceeded maximum duration, forcing checkout"
        );
        self.notify(ChangeEvent::SessionChanged);
        self.finalize(session, departure, true).await
    }

    /// Registration and slot handover, shared by manual and automatic
    /// checkout. `session.departure` is already set and persisted.
    async fn finalize(
        &self,
        session: ActiveSession,
        departure: DateTime<Utc>,
        auto: bool,
    ) -> Result<Option<DiaryEntry>> {
        self.reminders.cancel_all().await;

        let registered = self
            .registration
            .register(&session.venue, session.arrival, departure)
            .await;

        let _guard = self.slot_lock.lock().await;
        match registered {
            Ok(id) => {
                let entry =
                    DiaryEntry::new(id, session.venue.clone(), session.arrival, departure)?;
                let mut diary = self.store.diary().await?;
                diary.push(entry.clone());
                self.store.put_diary(&diary).await?;
                self.store.put_active_session(None).await?;

                metrics().check_outs_completed.inc();
                if auto {
                    metrics().auto_check_outs.inc();
                }
                info!(
                    venue = entry.venue().id(),
                    id = %entry.id(),
                    "Checked out"
                );

                drop(_guard);
                self.reminders.checkout_happened().await;
                self.notify(ChangeEvent::DiaryChanged);
                self.notify(ChangeEvent::SessionChanged);
                Ok(Some(entry))
            }
            Err(cause) => {
                self.store.put_active_session(None).await?;
                metrics().registrations_failed.inc();
                warn!(
                    venue = session.venue.id(),
                    arrival = %session.arrival,
                    departure = %departure,
                    error = %cause,
                    "Checkout registration failed, visit will not appear in the diary"
                );

                drop(_guard);
                self.notify(ChangeEvent::SessionChanged);
                Err(Error::Registration(cause))
            }
        }
    }

    /// Re-registers a diary entry under a corrected time window.
    ///
    /// The old entry is removed from the persisted diary while the
    /// update is in flight; on failure it is restored at its original
    /// position, so a failed edit is observably identical to no edit.
    pub async fn edit_diary_entry(
        &self,
        id: &CheckInId,
        new_arrival: DateTime<Utc>,
        new_departure: DateTime<Utc>,
    ) -> Result<DiaryEntry> {
        if new_departure < new_arrival {
            return Err(Error::InvalidTimeWindow {
                arrival: new_arrival,
                departure: new_departure,
            });
        }

        let (entry, index) = {
            let _guard = self.slot_lock.lock().await;

            let mut diary = self.store.diary().await?;
            let index = diary
                .iter()
                .position(|e| e.id() == id)
                .ok_or_else(|| Error::entry_not_found(id.as_str()))?;
            let entry = diary.remove(index);
            self.store.put_diary(&diary).await?;
            (entry, index)
        };

        self.notify(ChangeEvent::DiaryChanged);
        let outcome = self
            .registration
            .update(id, entry.venue(), new_arrival, new_departure)
            .await;

        let _guard = self.slot_lock.lock().await;
        let mut diary = self.store.diary().await?;
        match outcome {
            Ok(()) => {
                let updated = entry.with_window(new_arrival, new_departure)?;
                diary.push(updated.clone());
                self.store.put_diary(&diary).await?;
                metrics().diary_edits.inc();
                info!(id = %updated.id(), "Diary entry re-registered with edited window");

                drop(_guard);
                self.notify(ChangeEvent::DiaryChanged);
                Ok(updated)
            }
            Err(cause) => {
                // Restore at the original position; the diary shrank at
                // most by this one entry, so the index stays valid
                // unless concurrent hides removed earlier entries.
                let index = index.min(diary.len());
                diary.insert(index, entry);
                self.store.put_diary(&diary).await?;
                warn!(id = %id, error = %cause, "Diary edit failed, original entry restored");

                drop(_guard);
                self.notify(ChangeEvent::DiaryChanged);
                Err(Error::Registration(cause))
            }
        }
    }

    /// Removes the entry with `id` from the diary. Removing an absent
    /// identifier is a no-op, not an error.
    pub async fn hide_from_diary(&self, id: &CheckInId) -> Result<bool> {
        let _guard = self.slot_lock.lock().await;

        let mut diary = self.store.diary().await?;
        let before = diary.len();
        diary.retain(|e| e.id() != id);
        if diary.len() == before {
            return Ok(false);
        }

        self.store.put_diary(&diary).await?;
        metrics().entries_hidden.inc();
        info!(id = %id, "Diary entry hidden");

        drop(_guard);
        self.notify(ChangeEvent::DiaryChanged);
        Ok(true)
    }

    /// Purges entries older than the policy's window as of `today`.
    /// Returns how many entries were removed. Must be invoked
    /// explicitly (engine start, scheduler tick); the passage of time
    /// alone never mutates the diary.
    pub async fn retention_sweep(
        &self,
        policy: RetentionPolicy,
        today: DateTime<Utc>,
    ) -> Result<usize> {
        let _guard = self.slot_lock.lock().await;

        let diary = self.store.diary().await?;
        let before = diary.len();
        let kept: Vec<DiaryEntry> = diary
            .into_iter()
            .filter(|e| !policy.is_expired(e.arrival(), today))
            .collect();
        let purged = before - kept.len();
        if purged == 0 {
            return Ok(0);
        }

        self.store.put_diary(&kept).await?;
        metrics().entries_purged.inc_by(purged as u64);
        info!(
            purged,
            kept = kept.len(),
            retention_days = policy.retention_days,
            "Retention sweep complete"
        );

        drop(_guard);
        self.notify(ChangeEvent::DiaryChanged);
        Ok(purged)
    }

    /// Clears a session whose finalization was interrupted (e.g. the
    /// process died between persisting the departure and the
    /// registration outcome). Called once when the engine opens; the
    /// registration outcome is unknowable at this point, so the session
    /// is discarded the same way a failed registration is.
    pub async fn recover_interrupted_checkout(&self) -> Result<bool> {
        let _guard = self.slot_lock.lock().await;

        let Some(session) = self.store.active_session().await? else {
            return Ok(false);
        };
        if !session.is_finalizing() {
            return Ok(false);
        }

        self.store.put_active_session(None).await?;
        warn!(
            venue = session.venue.id(),
            arrival = %session.arrival,
            "Discarding session from an interrupted checkout"
        );

        drop(_guard);
        self.notify(ChangeEvent::SessionChanged);
        Ok(true)
    }
}
