//! Anonymized check-in registration client.
//!
//! The registration service turns a finalized arrival/departure window
//! plus a venue descriptor into an opaque identifier usable later for
//! exposure matching. The cryptographic derivation happens entirely on
//! the service side; this crate only carries the call.

pub mod client;
pub mod http;

pub use client::RegistrationClient;
pub use http::{HttpRegistrationClient, RegistrationConfig};

pub use checkin_core::RegistrationError;
