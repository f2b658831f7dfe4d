//! Durable slot storage for the check-in engine.
//!
//! The lifecycle manager persists two logical slots: the active session
//! and the visit diary. This crate provides the storage seam
//! ([`KeyValueStore`]), the typed wrapper the manager uses
//! ([`SlotStore`]), an atomic JSON-file implementation, and an
//! in-memory implementation for tests.

pub mod json_file;
pub mod memory;
pub mod store;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, SlotStore, DIARY_SLOT, SESSION_SLOT};
