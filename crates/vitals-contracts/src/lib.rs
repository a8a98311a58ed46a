//! # vitals-contracts
//!
//! Shared data model for the Vitals services: patient records and their
//! derived fields, partial-update payloads, premium prediction types, and
//! the unified error type.
//!
//! Every other crate in the workspace imports from here. Apart from field
//! validation and BMI derivation, which must run wherever a record is
//! materialized, no business logic lives in this crate.

pub mod error;
pub mod patient;
pub mod premium;
pub mod update;
pub mod verify;
