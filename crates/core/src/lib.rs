//! Core types and validation for the venue check-in engine.

pub mod diary;
pub mod error;
pub mod retention;
pub mod session;
pub mod venue;

pub use diary::{CheckInId, DiaryEntry};
pub use error::{Error, RegistrationError, Result};
pub use retention::{RetentionPolicy, DEFAULT_RETENTION_DAYS};
pub use session::{ActiveSession, CheckInPhase, MAX_SESSION_HOURS};
pub use venue::{VenueDescriptor, VenueType};
