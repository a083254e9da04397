//! Persistent store adapter for the event collection.
//!
//! The whole collection lives as one JSON array in a single key-value slot.
//! Loading never fails: a missing slot, an unreadable store, or data that no
//! longer parses all come back as an empty collection.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::kv::{FileKvStore, KeyValueStore, MemoryKvStore};
use crate::models::EventPlan;

/// Reads and writes the serialized event collection.
#[derive(Clone)]
pub struct PlanStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for PlanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanStore").field("key", &self.key).finish()
    }
}

impl PlanStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Open the file-backed store described by `config`.
    pub fn open(config: &StoreConfig) -> Self {
        Self::new(Arc::new(FileKvStore::new(config.store_path())), &config.key)
    }

    /// A store that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()), StoreConfig::DEFAULT_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection, newest first.
    ///
    /// Returns an empty collection when nothing has been stored yet or when
    /// the stored data cannot be read or parsed.
    pub fn load(&self) -> Vec<EventPlan> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read stored plans; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<EventPlan>>(&raw) {
            Ok(plans) => {
                info!(key = %self.key, count = plans.len(), "loaded stored plans");
                plans
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored plans do not parse; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize the entire collection into the slot, replacing what was there.
    pub fn save(&self, plans: &[EventPlan]) -> Result<(), StoreError> {
        let json = serde_json::to_string(plans)?;
        self.kv.set(&self.key, &json)
    }
}
