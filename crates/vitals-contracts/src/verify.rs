//! Request validation types.
//!
//! The HTTP layer checks every request body against a JSON Schema before
//! any core operation runs. A `ValidationReport` collects every violation
//! in one pass so the caller sees the full set at once.

use serde::{Deserialize, Serialize};

use crate::error::{VitalsError, VitalsResult};

/// Which request body is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// `POST /create`: id plus every patient attribute.
    CreatePatient,
    /// `PUT /edit/{id}`: any subset of patient attributes.
    UpdatePatient,
    /// `POST /predict`: premium predictor input.
    PremiumInput,
}

/// One field-level constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Top-level field name, or `"body"` when the violation is not tied to one.
    pub field: String,
    pub reason: String,
}

impl From<FieldViolation> for VitalsError {
    fn from(v: FieldViolation) -> Self {
        VitalsError::ValidationError {
            field: v.field,
            reason: v.reason,
        }
    }
}

/// The result of validating one request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if there are no violations.
    pub passed: bool,
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn from_violations(violations: Vec<FieldViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// `Ok(())` on pass, otherwise the first violation as a `ValidationError`.
    pub fn into_result(self) -> VitalsResult<()> {
        match self.violations.into_iter().next() {
            None => Ok(()),
            Some(v) => Err(v.into()),
        }
    }
}
