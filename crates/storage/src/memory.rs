//! In-memory store for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use checkin_core::{Error, Result};

use crate::store::KeyValueStore;

/// Volatile [`KeyValueStore`] with a fail switch for exercising
/// storage-failure paths.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, serde_json::Value>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Raw snapshot of a slot, for assertions.
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.slots.lock().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(Error::storage("simulated write failure"));
        }
        self.slots.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(Error::storage("simulated write failure"));
        }
        self.slots.lock().remove(key);
        Ok(())
    }
}
