//! In-memory implementation of `RecordStore`.
//!
//! `InMemoryStore` keeps the collection behind an `Arc<Mutex<_>>`. Clones
//! share the same state, so a test can hand one clone to a service and keep
//! another to inspect what was written.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::Collection,
};
use vitals_core::{collection_version, traits::RecordStore};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    pub(crate) collection: Collection,
    /// Number of successful writes, for tests and diagnostics.
    pub(crate) writes: u64,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A process-local store holding one collection.
#[derive(Clone)]
pub struct InMemoryStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::with_collection(Collection::new())
    }

    /// A store pre-loaded with `collection`.
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                collection,
                writes: 0,
            })),
        }
    }

    /// How many writes have been applied so far.
    pub fn write_count(&self) -> u64 {
        self.lock().map(|s| s.writes).unwrap_or_default()
    }

    fn lock(&self) -> VitalsResult<MutexGuard<'_, InMemoryState>> {
        self.state
            .lock()
            .map_err(|e| VitalsError::storage(format!("in-memory store lock poisoned: {e}")))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── RecordStore impl ──────────────────────────────────────────────────────────

impl RecordStore for InMemoryStore {
    fn read_all(&self) -> VitalsResult<Collection> {
        Ok(self.lock()?.collection.clone())
    }

    fn write_all(&self, collection: &Collection) -> VitalsResult<()> {
        let mut state = self.lock()?;
        state.collection = collection.clone();
        state.writes += 1;
        debug!(
            records = collection.len(),
            writes = state.writes,
            "in-memory collection replaced"
        );
        Ok(())
    }

    /// Compare and replace under one lock acquisition, so the check and the
    /// write are atomic with respect to every other caller of this store.
    fn write_if_version(&self, expected: &str, collection: &Collection) -> VitalsResult<()> {
        let mut state = self.lock()?;
        let current = collection_version(&state.collection)?;
        if current != expected {
            return Err(VitalsError::Conflict {
                reason: format!(
                    "collection changed since it was loaded (expected version {expected}, found {current})"
                ),
            });
        }
        state.collection = collection.clone();
        state.writes += 1;
        Ok(())
    }
}
