//! Unified error types for the check-in engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes of the external registration service.
///
/// The service is a black box; these variants only classify the failure
/// coarsely enough for callers to decide whether retrying later makes sense.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The service could not be reached (DNS, connect, timeout).
    #[error("registration service unreachable: {0}")]
    NetworkUnavailable(String),

    /// The service answered but refused the request.
    #[error("registration rejected (status {status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// Anything else, including malformed responses.
    #[error("registration failed: {0}")]
    Unknown(String),
}

/// Unified error type for the check-in engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The scanned payload did not describe a usable venue.
    #[error("malformed venue payload: {0}")]
    MalformedVenuePayload(String),

    /// A check-in was requested while a session is already active.
    #[error("a check-in session is already active")]
    AlreadyCheckedIn,

    /// The registration service failed; the wrapped cause says how.
    #[error("check-in registration failed")]
    Registration(#[from] RegistrationError),

    /// No diary entry with the given identifier exists.
    #[error("no diary entry with identifier {0}")]
    EntryNotFound(String),

    /// Departure before arrival.
    #[error("invalid time window: departure {departure} precedes arrival {arrival}")]
    InvalidTimeWindow {
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
    },

    /// The durable store failed; the operation in progress was aborted.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed-payload error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedVenuePayload(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn entry_not_found(id: impl Into<String>) -> Self {
        Self::EntryNotFound(id.into())
    }

    /// True if the failure came from the registration service.
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }
}
