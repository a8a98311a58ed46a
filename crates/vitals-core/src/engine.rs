//! The patient update engine.
//!
//! Every function here is a pure transformation over a record or an
//! in-memory collection. Loading and saving belong to the caller.
//!
//! Update algorithm:
//!
//! 1. Copy the existing record's attributes into a working copy.
//! 2. For each field present in the payload, overwrite the working copy.
//!    An explicit `null` is rejected, since no patient field is nullable.
//! 3. Re-validate the whole working copy, not just the touched fields.
//! 4. Re-derive bmi and verdict from the working copy's height and weight.

use tracing::{debug, warn};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::{Collection, PatientAttributes, PatientRecord},
    update::{Patch, PatientUpdate},
};

/// Merge `payload` into `existing` and return the re-validated record.
///
/// `id` is only used for diagnostics; the record does not carry it.
pub fn apply_update(
    id: &str,
    existing: &PatientRecord,
    payload: &PatientUpdate,
) -> VitalsResult<PatientRecord> {
    let mut working = existing.attributes().clone();

    merge_field("name", &payload.name, &mut working.name)?;
    merge_field("city", &payload.city, &mut working.city)?;
    merge_field("age", &payload.age, &mut working.age)?;
    merge_field("gender", &payload.gender, &mut working.gender)?;
    merge_field("height", &payload.height, &mut working.height)?;
    merge_field("weight", &payload.weight, &mut working.weight)?;

    let record = PatientRecord::new(working).inspect_err(|e| {
        warn!(patient_id = %id, error = %e, "merged record failed validation");
    })?;

    debug!(
        patient_id = %id,
        fields = ?payload.present_fields(),
        bmi = record.bmi(),
        verdict = %record.verdict(),
        "update merged"
    );

    Ok(record)
}

fn merge_field<T, U>(field: &str, patch: &Patch<U>, slot: &mut T) -> VitalsResult<()>
where
    U: Clone + Into<T>,
{
    match patch {
        Patch::Absent => Ok(()),
        Patch::Null => Err(VitalsError::invalid(field, "may not be null")),
        Patch::Value(value) => {
            *slot = value.clone().into();
            Ok(())
        }
    }
}

/// Apply `payload` to the record stored under `id` in `collection`.
///
/// Returns `NotFound` if `id` is absent. On any error the collection is
/// left exactly as it was.
pub fn update_in(
    collection: &mut Collection,
    id: &str,
    payload: &PatientUpdate,
) -> VitalsResult<PatientRecord> {
    let existing = collection
        .get(id)
        .ok_or_else(|| VitalsError::NotFound { id: id.to_string() })?;

    let updated = apply_update(id, existing, payload)?;
    collection.insert(id.to_string(), updated.clone());
    Ok(updated)
}

/// Materialize `attributes` and insert them under a new `id`.
///
/// Returns `DuplicateId` if `id` is already taken, without touching the
/// existing record.
pub fn insert_new(
    collection: &mut Collection,
    id: &str,
    attributes: PatientAttributes,
) -> VitalsResult<PatientRecord> {
    if id.trim().is_empty() {
        return Err(VitalsError::invalid("id", "must not be empty"));
    }
    if collection.contains_key(id) {
        return Err(VitalsError::DuplicateId { id: id.to_string() });
    }

    let record = PatientRecord::new(attributes)?;
    collection.insert(id.to_string(), record.clone());
    Ok(record)
}

/// Remove and return the record stored under `id`.
pub fn remove(collection: &mut Collection, id: &str) -> VitalsResult<PatientRecord> {
    collection
        .remove(id)
        .ok_or_else(|| VitalsError::NotFound { id: id.to_string() })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
