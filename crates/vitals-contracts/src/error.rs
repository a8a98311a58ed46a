//! Error types shared by every Vitals crate.
//!
//! All fallible operations return `VitalsResult<T>`. Variants carry enough
//! context for the HTTP layer to pick a status code and render a body
//! without re-inspecting the request.

use thiserror::Error;

/// The unified error type for the Vitals services.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VitalsError {
    /// The backing collection could not be read or written.
    ///
    /// Fatal for the current request. Never retried.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// No patient is stored under `id`.
    #[error("patient '{id}' not found")]
    NotFound { id: String },

    /// A create was attempted under an id that already exists.
    #[error("patient '{id}' already exists")]
    DuplicateId { id: String },

    /// A field constraint was violated, possibly only after a merge.
    #[error("validation failed for field '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    /// A query parameter (sort field or order) was not recognised.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// An optimistic write found the stored collection changed since load.
    #[error("write conflict: {reason}")]
    Conflict { reason: String },

    /// A configuration value is missing or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The premium model could not produce a prediction.
    #[error("model error: {reason}")]
    ModelError { reason: String },
}

impl VitalsError {
    /// Shorthand for a `ValidationError` on `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        VitalsError::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for `StorageUnavailable`.
    pub fn storage(reason: impl Into<String>) -> Self {
        VitalsError::StorageUnavailable {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the Vitals crates.
pub type VitalsResult<T> = Result<T, VitalsError>;
