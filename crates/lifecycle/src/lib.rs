//! Check-in session and diary lifecycle manager.
//!
//! The [`CheckInManager`] is the only entry point the rest of the
//! application calls: it owns the active-session slot and the visit
//! diary, talks to the durable store, the registration client, and the
//! reminder coordinator, and enforces every lifecycle invariant (at
//! most one active session, unique diary identifiers, registration
//! before durability, retention).

pub mod events;
pub mod manager;
pub mod reminders;
pub mod scheduler;

pub use events::ChangeEvent;
pub use manager::CheckInManager;
pub use reminders::{LogReminderScheduler, ReminderScheduler};
pub use scheduler::{LifecycleScheduler, SchedulerConfig};
