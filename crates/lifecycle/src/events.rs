//! Change notifications for collaborators.
//!
//! Persistence and presentation are decoupled: the manager emits a
//! change event after each completed mutation, and whoever renders the
//! diary subscribes instead of being refreshed from inside the write
//! path.

/// What part of the managed state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The active-session slot changed (started, finalizing, or cleared).
    SessionChanged,
    /// The diary collection changed (append, edit, hide, or purge).
    DiaryChanged,
}
