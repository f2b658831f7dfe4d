//! Storage seam and typed slot access.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use checkin_core::{ActiveSession, DiaryEntry, Error, Result};

/// Slot key for the single active session.
pub const SESSION_SLOT: &str = "active_session";

/// Slot key for the ordered visit diary.
pub const DIARY_SLOT: &str = "diary";

/// Generic durable key/value storage.
///
/// Contract: `put` is durable before it returns, and each write is
/// atomically visible; a reader never observes half of an intended
/// update. Values are JSON documents; typed access goes through
/// [`SlotStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed wrapper over a [`KeyValueStore`], aware of the two slots the
/// lifecycle manager owns.
#[derive(Clone)]
pub struct SlotStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SlotStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Reads and decodes a slot. A missing key decodes as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.inner.get(key).await? {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    /// Encodes and durably writes a slot.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.inner.put(key, value).await
    }

    /// Current active session, if any. A slot holding JSON `null` reads
    /// the same as an absent slot.
    pub async fn active_session(&self) -> Result<Option<ActiveSession>> {
        self.get::<Option<ActiveSession>>(SESSION_SLOT)
            .await
            .map(Option::flatten)
    }

    /// Replaces the active-session slot (pass `None` to clear it).
    pub async fn put_active_session(&self, session: Option<&ActiveSession>) -> Result<()> {
        self.put(SESSION_SLOT, &session).await
    }

    /// Current diary, in append order. A missing slot is an empty diary.
    pub async fn diary(&self) -> Result<Vec<DiaryEntry>> {
        Ok(self.get::<Vec<DiaryEntry>>(DIARY_SLOT).await?.unwrap_or_default())
    }

    /// Replaces the diary slot.
    pub async fn put_diary(&self, entries: &[DiaryEntry]) -> Result<()> {
        self.put(DIARY_SLOT, entries).await
    }
}

/// Maps a storage-layer IO failure into the engine error type.
pub(crate) fn io_error(context: &str, err: std::io::Error) -> Error {
    Error::storage(format!("{context}: {err}"))
}
