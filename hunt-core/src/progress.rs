//! Durable hunt progress and the storage capability behind it.
//!
//! Persistence is best-effort by contract: every operation degrades to
//! a no-op when the medium is unavailable, and a record that fails to
//! parse is treated as empty. In-memory session state stays
//! authoritative either way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Default namespaced key under which progress is stored.
pub const DEFAULT_STORAGE_KEY: &str = "hunt.progress";

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable")]
    Unavailable,
}

/// Key-value storage capability backing progress persistence.
///
/// Availability is probed per call rather than cached: the medium can
/// stop accepting writes at runtime (quota, permissions, removal).
pub trait ProgressStore {
    /// Probe whether the medium currently accepts reads and writes.
    fn is_available(&self) -> bool;

    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key` if present.
    fn remove(&mut self, key: &str);
}

/// The durable record of which spots have been completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    /// Completed spot ids in completion order, no duplicates.
    pub completed_spot_ids: Vec<String>,

    /// Top-level fields written by other schema versions, preserved
    /// verbatim across merge-saves.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressRecord {
    /// True when nothing has been completed and no foreign fields exist.
    pub fn is_empty(&self) -> bool {
        self.completed_spot_ids.is_empty() && self.extra.is_empty()
    }

    /// Whether `id` is already recorded as completed.
    pub fn contains(&self, id: &str) -> bool {
        self.completed_spot_ids.iter().any(|c| c == id)
    }

    /// Record a completion. Returns false when `id` was already present,
    /// so a double trigger can never duplicate an entry.
    pub fn record_completion(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.completed_spot_ids.push(id.to_string());
        true
    }

    /// Shallow overlay of `self` onto a previously stored record: every
    /// field of `self` wins per top-level key, unrelated stored keys
    /// survive.
    pub fn merge_onto(&self, stored: ProgressRecord) -> ProgressRecord {
        let mut extra = stored.extra;
        for (key, value) in &self.extra {
            extra.insert(key.clone(), value.clone());
        }
        ProgressRecord {
            completed_spot_ids: self.completed_spot_ids.clone(),
            extra,
        }
    }
}

/// Load the record stored under `key`.
///
/// Unavailable storage and unparseable content both yield an empty
/// record, never an error.
pub fn load_progress(store: &dyn ProgressStore, key: &str) -> ProgressRecord {
    if !store.is_available() {
        tracing::warn!(key, "storage unavailable, starting with empty progress");
        return ProgressRecord::default();
    }
    match store.get(key) {
        None => ProgressRecord::default(),
        Some(content) => match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored progress did not parse, treating as empty");
                ProgressRecord::default()
            }
        },
    }
}

/// Merge-save `record` under `key`.
///
/// Loads the currently stored record first and overlays `record` onto
/// it, so top-level fields this schema does not know about are kept.
/// Failures degrade to a no-op for this call.
pub fn save_progress(store: &mut dyn ProgressStore, key: &str, record: &ProgressRecord) {
    if !store.is_available() {
        tracing::warn!(key, "storage unavailable, progress not persisted");
        return;
    }

    let merged = record.merge_onto(load_progress(store, key));
    match serde_json::to_string(&merged) {
        Ok(content) => {
            if let Err(e) = store.set(key, &content) {
                tracing::warn!(key, error = %e, "failed to persist progress");
            }
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize progress");
        }
    }
}

/// Remove any record stored under `key`. No-op when unavailable.
pub fn clear_progress(store: &mut dyn ProgressStore, key: &str) {
    if !store.is_available() {
        return;
    }
    store.remove(key);
}

/// In-memory storage, always available.
///
/// The default medium for tests and for sessions that do not need
/// durability across runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed storage: one JSON file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`. The directory is created
    /// lazily on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let sanitized = key
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>();
        self.base_dir.join(format!("{sanitized}.json"))
    }
}

impl ProgressStore for FileStore {
    /// Write-then-remove probe of a sentinel file.
    fn is_available(&self) -> bool {
        let sentinel = self.base_dir.join(".probe");
        if std::fs::create_dir_all(&self.base_dir).is_err() {
            return false;
        }
        if std::fs::write(&sentinel, b"probe").is_err() {
            return false;
        }
        std::fs::remove_file(&sentinel).is_ok()
    }

    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        let _ = std::fs::remove_file(self.key_path(key));
    }
}
