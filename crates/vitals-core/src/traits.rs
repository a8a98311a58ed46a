//! Collaborator traits consumed by the Vitals core.
//!
//! - `RecordStore`     — persistence of the whole patient collection
//! - `PremiumModel`    — opaque premium classifier
//! - `RequestVerifier` — structural validation of request bodies
//!
//! Implementations live in sibling crates and are injected by whoever builds
//! the service. Nothing in the core reaches for a global.

use serde_json::Value;

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::Collection,
    premium::{PremiumFeatures, Prediction},
    verify::{RequestKind, ValidationReport},
};

use crate::version::collection_version;

/// Whole-collection persistence.
///
/// There are no per-record operations: every read returns the entire
/// collection and every write replaces it.
pub trait RecordStore: Send + Sync {
    /// Read every stored patient.
    ///
    /// Returns `StorageUnavailable` if the backing resource is missing,
    /// unreadable, or does not parse into valid records.
    fn read_all(&self) -> VitalsResult<Collection>;

    /// Replace the stored collection with `collection`.
    fn write_all(&self, collection: &Collection) -> VitalsResult<()>;

    /// Replace the stored collection only if its current version digest is
    /// `expected`; otherwise return `Conflict` and leave it untouched.
    ///
    /// The default implementation reads, compares, then writes, and is not
    /// atomic against other writers. Stores that can hold a lock across the
    /// comparison and the write should override it.
    fn write_if_version(&self, expected: &str, collection: &Collection) -> VitalsResult<()> {
        let current = collection_version(&self.read_all()?)?;
        if current != expected {
            return Err(VitalsError::Conflict {
                reason: format!(
                    "collection changed since it was loaded (expected version {expected}, found {current})"
                ),
            });
        }
        self.write_all(collection)
    }
}

/// An opaque premium category classifier.
pub trait PremiumModel: Send + Sync {
    /// Version string reported by the health endpoint.
    fn version(&self) -> &str;

    /// Classify one feature row.
    fn predict(&self, features: &PremiumFeatures) -> VitalsResult<Prediction>;
}

/// Structural validation of an incoming request body.
///
/// Runs before the body is deserialized into a typed payload. The core
/// re-validates typed values regardless; this layer exists so the caller
/// gets every violation at once instead of the first one.
pub trait RequestVerifier: Send + Sync {
    fn verify(&self, kind: RequestKind, body: &Value) -> VitalsResult<ValidationReport>;
}
