//! Venue descriptor types.
//!
//! A [`VenueDescriptor`] is produced once, by an upstream parser of the
//! scanned QR payload, and never mutated afterwards. This crate only
//! validates the already-parsed fields; it never decodes the raw payload.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// Venue category (as carried in the QR payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    Restaurant,
    Retail,
    Workplace,
    EducationalInstitution,
    PublicBuilding,
    Event,
    Accommodation,
    #[default]
    Other,
}

/// Immutable description of a venue and its check-in policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VenueDescriptor {
    /// Identifier derived from the QR payload.
    #[validate(length(min = 1, max = 128))]
    id: String,
    /// Display address.
    #[validate(length(max = 256))]
    address: String,
    /// Optional room within the venue.
    #[validate(length(max = 128))]
    room: Option<String>,
    venue_type: VenueType,
    /// Reminder offsets after arrival, in seconds, strictly ascending.
    /// The implicit "no reminder" option is not stored; see
    /// [`VenueDescriptor::reminder_options`].
    reminder_offsets_secs: Option<Vec<i64>>,
    /// Venue-suggested automatic checkout delay, in seconds.
    auto_checkout_after_secs: Option<i64>,
    /// Delay after arrival at which a checkout warning is due, in seconds.
    checkout_warning_after_secs: Option<i64>,
}

impl VenueDescriptor {
    /// Creates a descriptor with no policy parameters.
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        venue_type: VenueType,
    ) -> Result<Self> {
        let descriptor = Self {
            id: id.into(),
            address: address.into(),
            room: None,
            venue_type,
            reminder_offsets_secs: None,
            auto_checkout_after_secs: None,
            checkout_warning_after_secs: None,
        };
        descriptor.check()
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Result<Self> {
        self.room = Some(room.into());
        self.check()
    }

    /// Sets the reminder offsets (seconds after arrival, strictly ascending).
    pub fn with_reminder_offsets(mut self, offsets_secs: Vec<i64>) -> Result<Self> {
        self.reminder_offsets_secs = Some(offsets_secs);
        self.check()
    }

    pub fn with_auto_checkout_after(mut self, after: Duration) -> Result<Self> {
        self.auto_checkout_after_secs = Some(after.num_seconds());
        self.check()
    }

    pub fn with_checkout_warning_after(mut self, after: Duration) -> Result<Self> {
        self.checkout_warning_after_secs = Some(after.num_seconds());
        self.check()
    }

    fn check(self) -> Result<Self> {
        self.validate()
            .map_err(|e| Error::malformed(e.to_string()))?;

        if let Some(offsets) = &self.reminder_offsets_secs {
            let ascending = offsets.windows(2).all(|w| w[0] < w[1]);
            if !ascending || offsets.iter().any(|&o| o <= 0) {
                return Err(Error::malformed(
                    "reminder offsets must be positive and strictly ascending",
                ));
            }
        }
        for (field, value) in [
            ("auto checkout delay", self.auto_checkout_after_secs),
            ("checkout warning delay", self.checkout_warning_after_secs),
        ] {
            if matches!(value, Some(secs) if secs <= 0) {
                return Err(Error::malformed(format!("{field} must be positive")));
            }
        }
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn venue_type(&self) -> VenueType {
        self.venue_type
    }

    /// Reminder choices in presentation order: `None` ("no reminder")
    /// first, then the configured offsets ascending.
    pub fn reminder_options(&self) -> Vec<Option<Duration>> {
        let mut options = vec![None];
        if let Some(offsets) = &self.reminder_offsets_secs {
            options.extend(offsets.iter().map(|&s| Some(Duration::seconds(s))));
        }
        options
    }

    /// True if `offset` is one of this venue's configured reminder offsets.
    pub fn allows_reminder_offset(&self, offset: Duration) -> bool {
        self.reminder_offsets_secs
            .as_deref()
            .unwrap_or_default()
            .contains(&offset.num_seconds())
    }

    pub fn auto_checkout_after(&self) -> Option<Duration> {
        self.auto_checkout_after_secs.map(Duration::seconds)
    }

    pub fn checkout_warning_after(&self) -> Option<Duration> {
        self.checkout_warning_after_secs.map(Duration::seconds)
    }
}
