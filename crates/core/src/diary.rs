//! Diary entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::venue::VenueDescriptor;

/// Opaque check-in identifier issued by the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckInId(String);

impl CheckInId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CheckInId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckInId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A finalized, registered venue visit.
///
/// Entries exist only in the diary collection, uniquely identified by
/// their registration identifier, and always carry both timestamps.
/// A visit without a departure is, by definition, still the active
/// session and never a diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    id: CheckInId,
    venue: VenueDescriptor,
    arrival: DateTime<Utc>,
    departure: DateTime<Utc>,
}

impl DiaryEntry {
    /// Creates an entry, enforcing a non-empty identifier and
    /// `departure >= arrival`.
    pub fn new(
        id: CheckInId,
        venue: VenueDescriptor,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Result<Self> {
        if id.is_empty() {
            return Err(Error::malformed("diary entry identifier must not be empty"));
        }
        if departure < arrival {
            return Err(Error::InvalidTimeWindow { arrival, departure });
        }
        Ok(Self {
            id,
            venue,
            arrival,
            departure,
        })
    }

    /// The same visit with an updated time window (same identifier).
    pub fn with_window(
        &self,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Result<Self> {
        Self::new(self.id.clone(), self.venue.clone(), arrival, departure)
    }

    pub fn id(&self) -> &CheckInId {
        &self.id
    }

    pub fn venue(&self) -> &VenueDescriptor {
        &self.venue
    }

    pub fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }

    pub fn departure(&self) -> DateTime<Utc> {
        self.departure
    }

    /// Visit duration.
    pub fn duration(&self) -> chrono::Duration {
        self.departure - self.arrival
    }
}
