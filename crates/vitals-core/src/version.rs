//! Collection version digests.
//!
//! The version of a collection is the SHA-256 of its JSON serialization,
//! hex encoded. `Collection` is a `BTreeMap`, so equal collections always
//! serialize to the same bytes and produce the same version.

use sha2::{Digest, Sha256};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::Collection,
};

/// Compute the version digest of `collection`.
pub fn collection_version(collection: &Collection) -> VitalsResult<String> {
    let bytes = serde_json::to_vec(collection).map_err(|e| {
        VitalsError::storage(format!("failed to serialize collection for versioning: {e}"))
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use vitals_contracts::patient::{Collection, Gender, PatientAttributes, PatientRecord};

    use super::collection_version;

    fn record(weight: f64) -> PatientRecord {
        PatientRecord::new(PatientAttributes {
            name: "Meera Iyer".into(),
            city: "Chennai".into(),
            age: 41,
            gender: Gender::Female,
            height: 1.6,
            weight,
        })
        .unwrap()
    }

    #[test]
    fn equal_collections_share_a_version() {
        let mut a = Collection::new();
        a.insert("P001".into(), record(60.0));
        a.insert("P002".into(), record(70.0));

        let mut b = Collection::new();
        b.insert("P002".into(), record(70.0));
        b.insert("P001".into(), record(60.0));

        assert_eq!(collection_version(&a).unwrap(), collection_version(&b).unwrap());
    }

    #[test]
    fn any_change_alters_the_version() {
        let mut a = Collection::new();
        a.insert("P001".into(), record(60.0));
        let before = collection_version(&a).unwrap();

        a.insert("P001".into(), record(61.0));
        let after = collection_version(&a).unwrap();

        assert_ne!(before, after);
        assert_eq!(after.len(), 64, "hex-encoded SHA-256");
    }
}
