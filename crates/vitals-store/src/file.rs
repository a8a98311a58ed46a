//! JSON-file implementation of `RecordStore`.
//!
//! The file holds a single JSON object mapping patient id to record. Every
//! write serializes the whole collection to a sibling temp file and renames
//! it over the original, so a concurrent reader sees either the old file or
//! the new one, never a partial write.
//!
//! Records are re-materialized on every read: stored `bmi` and `verdict`
//! values are ignored and recomputed, and a record that fails validation
//! makes the whole file unreadable.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::Collection,
};
use vitals_core::{collection_version, traits::RecordStore};

/// A store backed by one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes writers within this process. Other processes are not
    /// coordinated with.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Use the file at `path`. The file is not touched until the first
    /// read or write; a missing file surfaces then as `StorageUnavailable`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Like `open`, but first writes an empty collection if nothing exists
    /// at `path` yet.
    pub fn open_or_create(path: impl Into<PathBuf>) -> VitalsResult<Self> {
        let store = Self::open(path);
        if !store.path.exists() {
            info!(path = %store.path.display(), "creating empty patient file");
            store.replace(&Collection::new())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> VitalsResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| VitalsError::storage(format!("file store lock poisoned: {e}")))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "patients.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write `collection` to the temp file and rename it into place.
    fn replace(&self, collection: &Collection) -> VitalsResult<()> {
        let body = serde_json::to_string_pretty(collection).map_err(|e| {
            VitalsError::storage(format!("failed to serialize patient collection: {e}"))
        })?;

        let tmp = self.temp_path();
        fs::write(&tmp, body).map_err(|e| {
            VitalsError::storage(format!("failed to write '{}': {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "rename into place failed");
            VitalsError::storage(format!(
                "failed to move '{}' over '{}': {e}",
                tmp.display(),
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), records = collection.len(), "patient file written");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn read_all(&self) -> VitalsResult<Collection> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            VitalsError::storage(format!(
                "failed to read patient file '{}': {e}",
                self.path.display()
            ))
        })?;

        let collection: Collection = serde_json::from_str(&contents).map_err(|e| {
            VitalsError::storage(format!(
                "failed to parse patient file '{}': {e}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), records = collection.len(), "patient file loaded");
        Ok(collection)
    }

    fn write_all(&self, collection: &Collection) -> VitalsResult<()> {
        let _guard = self.lock()?;
        self.replace(collection)
    }

    /// Compare and replace while holding the process-local write lock.
    fn write_if_version(&self, expected: &str, collection: &Collection) -> VitalsResult<()> {
        let _guard = self.lock()?;
        let current = collection_version(&self.read_all()?)?;
        if current != expected {
            return Err(VitalsError::Conflict {
                reason: format!(
                    "patient file '{}' changed since it was loaded",
                    self.path.display()
                ),
            });
        }
        self.replace(collection)
    }
}
