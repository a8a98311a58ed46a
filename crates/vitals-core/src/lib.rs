//! # vitals-core
//!
//! The patient record core for the Vitals services.
//!
//! This crate provides:
//! - The collaborator traits (`RecordStore`, `PremiumModel`, `RequestVerifier`)
//! - The patient update engine: partial merge, whole-record re-validation,
//!   and bmi/verdict re-derivation
//! - `PatientService`, which runs every mutation as load → mutate → save
//!   under a configurable `ConsistencyMode`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitals_core::{PatientService, ConsistencyMode};
//!
//! let service = PatientService::new(Box::new(store), ConsistencyMode::Serialized);
//! service.update("P001", &payload)?;
//! ```

pub mod engine;
pub mod query;
pub mod service;
pub mod traits;
pub mod version;

pub use service::{ConsistencyMode, PatientService};
pub use version::collection_version;
