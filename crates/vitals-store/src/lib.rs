//! # vitals-store
//!
//! `RecordStore` implementations for the Vitals patient service.
//!
//! - [`InMemoryStore`] keeps the collection in process memory. Useful for
//!   tests and for the demo's scratch mode.
//! - [`JsonFileStore`] keeps the collection in one JSON file keyed by
//!   patient id, replaced whole on every write.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitals_core::{ConsistencyMode, PatientService};
//! use vitals_store::JsonFileStore;
//!
//! let store = JsonFileStore::open_or_create("patients.json")?;
//! let service = PatientService::new(Box::new(store), ConsistencyMode::LastWriteWins);
//! ```

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use vitals_contracts::{
        error::VitalsError,
        patient::{Collection, Gender, PatientAttributes, PatientRecord},
    };
    use vitals_core::{collection_version, traits::RecordStore};

    use super::InMemoryStore;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn collection(ids: &[&str]) -> Collection {
        ids.iter()
            .map(|id| {
                let record = PatientRecord::new(PatientAttributes {
                    name: format!("Patient {id}"),
                    city: "Lucknow".into(),
                    age: 45,
                    gender: Gender::Male,
                    height: 1.75,
                    weight: 80.0,
                })
                .unwrap();
                (id.to_string(), record)
            })
            .collect()
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_read_returns_what_was_written() {
        let store = InMemoryStore::new();
        assert!(store.read_all().unwrap().is_empty());

        store.write_all(&collection(&["P001", "P002"])).unwrap();
        let loaded = store.read_all().unwrap();

        assert_eq!(loaded, collection(&["P001", "P002"]));
        assert_eq!(store.write_count(), 1);
    }

    /// Clones share state, so a caller can observe writes made through
    /// another handle.
    #[test]
    fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let handle = store.clone();
        handle.write_all(&collection(&["P001"])).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_write_if_version_accepts_current_version() {
        let store = InMemoryStore::with_collection(collection(&["P001"]));
        let version = collection_version(&store.read_all().unwrap()).unwrap();

        store
            .write_if_version(&version, &collection(&["P001", "P002"]))
            .unwrap();
        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_write_if_version_rejects_stale_version() {
        let store = InMemoryStore::with_collection(collection(&["P001"]));
        let stale = collection_version(&store.read_all().unwrap()).unwrap();
        store.write_all(&collection(&["P001", "P002"])).unwrap();

        let err = store.write_if_version(&stale, &Collection::new()).unwrap_err();
        assert!(matches!(err, VitalsError::Conflict { .. }));
        assert_eq!(store.read_all().unwrap().len(), 2, "stale write must not apply");
    }

    /// A poisoned lock surfaces as `StorageUnavailable`, not a panic.
    #[test]
    fn test_poisoned_lock_is_storage_unavailable() {
        let store = InMemoryStore::new();
        let handle = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.state.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        assert!(matches!(
            store.read_all(),
            Err(VitalsError::StorageUnavailable { .. })
        ));
    }
}
