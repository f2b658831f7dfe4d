//! Internal telemetry for the check-in engine.
//!
//! Structured logging setup plus in-memory lifecycle counters; no
//! external metrics system is involved.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
