//! `PatientService`: request-scoped orchestration over a `RecordStore`.
//!
//! Every operation loads the full collection fresh from the store. Mutations
//! apply an engine function to the loaded copy and write the whole
//! collection back. Nothing is cached between calls.
//!
//! How concurrent mutations interact is decided by `ConsistencyMode`:
//!
//! - `LastWriteWins` — no coordination. Two mutations that load the same
//!   pre-state both succeed and the later save discards the earlier one.
//! - `Serialized` — a service-wide lock is held from load through save.
//! - `Optimistic` — the collection's version digest is captured at load and
//!   the save is conditional on it; a lost race returns `Conflict`.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::{Collection, PatientAttributes, PatientRecord},
    update::PatientUpdate,
};

use crate::{
    engine,
    query::{self, SortField, SortOrder},
    traits::RecordStore,
    version::collection_version,
};

/// How mutations coordinate with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsistencyMode {
    #[default]
    LastWriteWins,
    Serialized,
    Optimistic,
}

/// The patient CRUD service.
///
/// Owns its store; construct one per process and share it by reference.
pub struct PatientService {
    store: Box<dyn RecordStore>,
    mode: ConsistencyMode,
    write_lock: Mutex<()>,
}

impl PatientService {
    pub fn new(store: Box<dyn RecordStore>, mode: ConsistencyMode) -> Self {
        Self {
            store,
            mode,
            write_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// The full collection.
    pub fn list(&self) -> VitalsResult<Collection> {
        self.store.read_all()
    }

    pub fn get(&self, id: &str) -> VitalsResult<PatientRecord> {
        self.store
            .read_all()?
            .remove(id)
            .ok_or_else(|| VitalsError::NotFound { id: id.to_string() })
    }

    /// Every record ordered by `sort_by` (`height`, `weight` or `bmi`).
    ///
    /// `order` is `asc` or `desc`, defaulting to `asc`. The query is checked
    /// before the store is touched.
    pub fn sorted(
        &self,
        sort_by: &str,
        order: Option<&str>,
    ) -> VitalsResult<Vec<(String, PatientRecord)>> {
        let field: SortField = sort_by.parse()?;
        let order = order
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();
        Ok(query::sorted(&self.store.read_all()?, field, order))
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    pub fn create(&self, id: &str, attributes: PatientAttributes) -> VitalsResult<PatientRecord> {
        let record = self.mutate("create", |c| engine::insert_new(c, id, attributes))?;
        info!(patient_id = %id, verdict = %record.verdict(), "patient created");
        Ok(record)
    }

    pub fn update(&self, id: &str, payload: &PatientUpdate) -> VitalsResult<PatientRecord> {
        let record = self.mutate("update", |c| engine::update_in(c, id, payload))?;
        info!(
            patient_id = %id,
            fields = ?payload.present_fields(),
            verdict = %record.verdict(),
            "patient updated"
        );
        Ok(record)
    }

    pub fn delete(&self, id: &str) -> VitalsResult<PatientRecord> {
        let record = self.mutate("delete", |c| engine::remove(c, id))?;
        info!(patient_id = %id, "patient deleted");
        Ok(record)
    }

    /// Load, apply `op`, save. `op` failing means nothing is written.
    fn mutate<T>(
        &self,
        operation: &str,
        op: impl FnOnce(&mut Collection) -> VitalsResult<T>,
    ) -> VitalsResult<T> {
        let _guard = match self.mode {
            ConsistencyMode::Serialized => Some(self.write_lock.lock().map_err(|e| {
                VitalsError::storage(format!("service write lock poisoned: {e}"))
            })?),
            ConsistencyMode::LastWriteWins | ConsistencyMode::Optimistic => None,
        };

        let mut collection = self.store.read_all()?;
        let loaded_version = match self.mode {
            ConsistencyMode::Optimistic => Some(collection_version(&collection)?),
            ConsistencyMode::LastWriteWins | ConsistencyMode::Serialized => None,
        };

        debug!(
            operation,
            mode = ?self.mode,
            records = collection.len(),
            "collection loaded"
        );

        let output = op(&mut collection)?;

        match loaded_version {
            Some(expected) => self
                .store
                .write_if_version(&expected, &collection)
                .inspect_err(|e| {
                    if matches!(e, VitalsError::Conflict { .. }) {
                        warn!(operation, "optimistic write lost a race");
                    }
                })?,
            None => self.store.write_all(&collection)?,
        }

        debug!(operation, records = collection.len(), "collection saved");
        Ok(output)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use vitals_contracts::{
        error::{VitalsError, VitalsResult},
        patient::{Collection, Gender, PatientAttributes},
        update::{Patch, PatientUpdate},
    };

    use crate::traits::RecordStore;

    use super::{ConsistencyMode, PatientService};

    // ── Mock helpers ──────────────────────────────────────────────────────────

    /// A store that keeps one collection and counts writes.
    #[derive(Clone, Default)]
    struct MockStore {
        data: Arc<Mutex<Collection>>,
        writes: Arc<Mutex<u32>>,
        fail_reads: bool,
    }

    impl RecordStore for MockStore {
        fn read_all(&self) -> VitalsResult<Collection> {
            if self.fail_reads {
                return Err(VitalsError::storage("backing file missing"));
            }
            Ok(self.data.lock().unwrap().clone())
        }

        fn write_all(&self, collection: &Collection) -> VitalsResult<()> {
            *self.data.lock().unwrap() = collection.clone();
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn attrs(name: &str) -> PatientAttributes {
        PatientAttributes {
            name: name.to_string(),
            city: "Delhi".into(),
            age: 30,
            gender: Gender::Female,
            height: 1.7,
            weight: 72.0,
        }
    }

    fn service(store: &MockStore, mode: ConsistencyMode) -> PatientService {
        PatientService::new(Box::new(store.clone()), mode)
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_create_then_get() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::LastWriteWins);

        svc.create("P001", attrs("Isha")).unwrap();
        let record = svc.get("P001").unwrap();
        assert_eq!(record.name(), "Isha");
        assert_eq!(*store.writes.lock().unwrap(), 1);
    }

    #[test]
    fn test_second_create_is_duplicate() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::Serialized);

        svc.create("P001", attrs("Isha")).unwrap();
        let err = svc.create("P001", attrs("Kabir")).unwrap_err();

        assert_eq!(err, VitalsError::DuplicateId { id: "P001".into() });
        assert_eq!(svc.get("P001").unwrap().name(), "Isha");
        assert_eq!(*store.writes.lock().unwrap(), 1, "failed create must not write");
    }

    #[test]
    fn test_update_unknown_id_on_empty_collection() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::LastWriteWins);

        let err = svc.update("P999", &PatientUpdate::default()).unwrap_err();
        assert_eq!(err, VitalsError::NotFound { id: "P999".into() });
        assert_eq!(*store.writes.lock().unwrap(), 0);
    }

    /// A merge that fails validation leaves the stored record untouched.
    #[test]
    fn test_invalid_update_not_persisted() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::LastWriteWins);
        svc.create("P001", attrs("Isha")).unwrap();
        let before = svc.get("P001").unwrap();

        let payload = PatientUpdate {
            age: Patch::Value(200),
            ..PatientUpdate::default()
        };
        match svc.update("P001", &payload) {
            Err(VitalsError::ValidationError { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
        assert_eq!(svc.get("P001").unwrap(), before);
    }

    #[test]
    fn test_delete() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::Optimistic);
        svc.create("P001", attrs("Isha")).unwrap();

        svc.delete("P001").unwrap();
        assert!(svc.list().unwrap().is_empty());
        assert_eq!(
            svc.delete("P001").unwrap_err(),
            VitalsError::NotFound { id: "P001".into() }
        );
    }

    #[test]
    fn test_sorted_rejects_bad_query_before_reading() {
        let store = MockStore {
            fail_reads: true,
            ..MockStore::default()
        };
        let svc = service(&store, ConsistencyMode::LastWriteWins);

        assert!(matches!(
            svc.sorted("age", None),
            Err(VitalsError::InvalidQuery { .. })
        ));
        assert!(matches!(
            svc.sorted("bmi", None),
            Err(VitalsError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let store = MockStore {
            fail_reads: true,
            ..MockStore::default()
        };
        let svc = service(&store, ConsistencyMode::Serialized);
        assert!(matches!(
            svc.create("P001", attrs("Isha")),
            Err(VitalsError::StorageUnavailable { .. })
        ));
    }

    /// The default `write_if_version` detects a collection changed behind
    /// the service's back.
    #[test]
    fn test_default_write_if_version_detects_change() {
        let store = MockStore::default();
        let svc = service(&store, ConsistencyMode::Optimistic);
        svc.create("P001", attrs("Isha")).unwrap();

        let stale = crate::collection_version(&store.read_all().unwrap()).unwrap();
        svc.create("P002", attrs("Kabir")).unwrap();

        let err = store.write_if_version(&stale, &Collection::new()).unwrap_err();
        assert!(matches!(err, VitalsError::Conflict { .. }));
        assert_eq!(store.read_all().unwrap().len(), 2);
    }
}
