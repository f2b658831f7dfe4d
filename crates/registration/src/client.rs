//! Registration client seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use checkin_core::{CheckInId, RegistrationError, VenueDescriptor};

/// External check-in registration service.
///
/// Both calls are black boxes: no retry policy lives behind this trait,
/// and callers decide what a failure means for their own state.
#[async_trait]
pub trait RegistrationClient: Send + Sync {
    /// Registers a finalized visit window and returns its opaque identifier.
    async fn register(
        &self,
        venue: &VenueDescriptor,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    ) -> Result<CheckInId, RegistrationError>;

    /// Re-registers an existing visit under a corrected time window.
    async fn update(
        &self,
        id: &CheckInId,
        venue: &VenueDescriptor,
        new_arrival: DateTime<Utc>,
        new_departure: DateTime<Utc>,
    ) -> Result<(), RegistrationError>;
}
