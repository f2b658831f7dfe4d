//! Active check-in session types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::diary::CheckInId;
use crate::venue::VenueDescriptor;

/// Production ceiling on session length before forced checkout (hours).
/// Test builds typically configure a much shorter interval.
pub const MAX_SESSION_HOURS: i64 = 12;

/// The single in-progress venue visit.
///
/// At most one instance exists at any time; it lives in the durable
/// store's `active_session` slot, never in a collection. A set
/// `departure` marks the transient finalizing sub-state: checkout has
/// started but the registration outcome is not yet known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    /// Opaque registration identifier; `None` until finalization completes.
    pub registration_id: Option<CheckInId>,
    /// Raw scanned payload the venue descriptor was parsed from.
    pub qr_payload: String,
    pub venue: VenueDescriptor,
    pub arrival: DateTime<Utc>,
    /// Set when checkout is initiated, before finalization completes.
    pub departure: Option<DateTime<Utc>>,
}

impl ActiveSession {
    /// Starts a new session at `arrival`.
    pub fn begin(
        qr_payload: impl Into<String>,
        venue: VenueDescriptor,
        arrival: DateTime<Utc>,
    ) -> Self {
        Self {
            registration_id: None,
            qr_payload: qr_payload.into(),
            venue,
            arrival,
            departure: None,
        }
    }

    /// True once checkout has been initiated for this session.
    pub fn is_finalizing(&self) -> bool {
        self.departure.is_some()
    }

    /// Time spent at the venue so far.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.arrival
    }

    /// True if the session has outlived `max_duration` at `now`.
    pub fn exceeds(&self, now: DateTime<Utc>, max_duration: Duration) -> bool {
        self.elapsed(now) >= max_duration
    }
}

/// Explicit state of the check-in slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CheckInPhase {
    /// No session.
    Idle,
    /// Session present, checkout not initiated.
    Active { arrival: DateTime<Utc> },
    /// Checkout initiated, registration outcome pending.
    Finalizing {
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    },
}

impl CheckInPhase {
    /// Derives the phase from the session slot.
    pub fn of(slot: Option<&ActiveSession>) -> Self {
        match slot {
            None => Self::Idle,
            Some(session) => match session.departure {
                None => Self::Active {
                    arrival: session.arrival,
                },
                Some(departure) => Self::Finalizing {
                    arrival: session.arrival,
                    departure,
                },
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
