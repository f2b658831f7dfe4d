//! Atomic JSON-file slot store.
//!
//! All slots live in one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "slots": {
//!     "active_session": { ... },
//!     "diary": [ ... ]
//!   }
//! }
//! ```
//!
//! Every write rewrites the document through a temp file in the same
//! directory followed by a rename, so a crash mid-write leaves either
//! the old document or the new one, never a torn file.
//!
//! Loads are defensive: a missing, empty, corrupt, or
//! unsupported-version file opens as an empty store with a warning.
//! The encryption-at-rest wrapping of this file is the platform's
//! concern, not this crate's.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

use checkin_core::Result;

use crate::store::{io_error, KeyValueStore};

const STORE_VERSION: u32 = 1;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoreFile {
    version: u32,
    slots: BTreeMap<String, serde_json::Value>,
}

impl Default for StoreFile {
    fn default() -> Self {
        StoreFile {
            version: STORE_VERSION,
            slots: BTreeMap::new(),
        }
    }
}

/// File-backed store with write-through in-memory slots.
pub struct JsonFileStore {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl JsonFileStore {
    /// Opens (or initializes) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let slots = Self::load_slots(&path);
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    fn load_slots(path: &Path) -> BTreeMap<String, serde_json::Value> {
        if !path.exists() {
            return BTreeMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable store file, starting empty");
                return BTreeMap::new();
            }
        };

        if content.trim().is_empty() {
            warn!(path = %path.display(), "Empty store file, starting empty");
            return BTreeMap::new();
        }

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) if file.version == STORE_VERSION => file.slots,
            Ok(file) => {
                warn!(
                    path = %path.display(),
                    version = file.version,
                    "Unsupported store file version, starting empty"
                );
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt store file, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// Serializes the given slots and atomically replaces the file.
    fn persist(&self, slots: &BTreeMap<String, serde_json::Value>) -> Result<()> {
        let file = StoreFile {
            version: STORE_VERSION,
            slots: slots.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| io_error("create store directory", e))?;

        let mut temp =
            NamedTempFile::new_in(parent).map_err(|e| io_error("create temp store file", e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| io_error("write temp store file", e))?;
        temp.flush().map_err(|e| io_error("flush temp store file", e))?;
        temp.persist(&self.path)
            .map_err(|e| io_error("replace store file", e.error))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut slots = self.slots.lock();
        let previous = slots.insert(key.to_string(), value);
        if let Err(e) = self.persist(&slots) {
            // Write-through failed: roll the cache back so memory never
            // diverges from what the file durably holds.
            match previous {
                Some(prev) => slots.insert(key.to_string(), prev),
                None => slots.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.lock();
        let previous = slots.remove(key);
        if let Err(e) = self.persist(&slots) {
            if let Some(prev) = previous {
                slots.insert(key.to_string(), prev);
            }
            return Err(e);
        }
        Ok(())
    }
}
