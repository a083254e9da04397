//! String key-value substrates.
//!
//! [`KeyValueStore`] is the seam between the plan store and wherever bytes
//! actually live. [`FileKvStore`] keeps every slot in one JSON object file;
//! [`MemoryKvStore`] keeps them in process and counts writes, which tests
//! use to check write-through behaviour.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::error::StoreError;

/// A minimal string-keyed get/set store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// Compile-time assertion: KeyValueStore must be usable as `dyn KeyValueStore`.
const _: () = {
    fn _assert_object_safe(_: &dyn KeyValueStore) {}
};

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Key-value store persisted as a single JSON object file.
///
/// Every `set` rewrites the whole file through a temporary file and an atomic
/// rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(slots)?;
        let mut f = fs::File::create(&temp).map_err(|e| StoreError::io(&temp, e))?;
        f.write_all(content.as_bytes())
            .map_err(|e| StoreError::io(&temp, e))?;
        f.sync_all().map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        let mut slots = match self.read_all() {
            Ok(slots) => slots,
            Err(StoreError::Json(e)) => {
                // Unreadable contents are replaced, not merged.
                let backup = self.path.with_extension("json.corrupt");
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "store file is corrupt; moving it aside"
                );
                fs::rename(&self.path, &backup).map_err(|e| StoreError::io(&backup, e))?;
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(key.to_owned(), value.to_owned());
        self.write_all(&slots)?;
        debug!(path = %self.path.display(), key, bytes = value.len(), "slot written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with one slot pre-populated.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_owned(), value.to_owned());
        }
        store
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        slots.insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
