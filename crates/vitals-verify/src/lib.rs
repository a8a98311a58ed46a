//! # vitals-verify
//!
//! Request-body validation for the Vitals services.
//!
//! This crate provides [`engine::SchemaVerifier`], which implements the
//! [`vitals_core::traits::RequestVerifier`] trait. Each request kind has a
//! JSON Schema (see [`schemas`]), compiled once at registration, encoding the field constraints of the
//! patient and premium models. Violations are reported per top-level field
//! so the HTTP layer can return them all in one response.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use vitals_contracts::verify::RequestKind;
//! use vitals_core::traits::RequestVerifier;
//! use vitals_verify::engine::SchemaVerifier;
//!
//! let verifier = SchemaVerifier::new()?;
//! let report = verifier.verify(RequestKind::UpdatePatient, &body)?;
//! ```

pub mod engine;
pub mod schemas;

pub use engine::SchemaVerifier;
