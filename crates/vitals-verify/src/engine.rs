//! Schema-based request verifier.
//!
//! `SchemaVerifier` implements the `RequestVerifier` trait from
//! `vitals-core`. It looks up the JSON Schema for the request kind, runs the
//! body through it, and maps every error to a `FieldViolation` keyed by the
//! top-level field it concerns.

use std::collections::HashMap;

use jsonschema::{error::ValidationErrorKind, Validator};
use serde_json::Value;
use tracing::{debug, warn};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    verify::{FieldViolation, RequestKind, ValidationReport},
};
use vitals_core::traits::RequestVerifier;

use crate::schemas;

/// Validates request bodies against one compiled JSON Schema per
/// `RequestKind`.
pub struct SchemaVerifier {
    validators: HashMap<RequestKind, Validator>,
}

impl SchemaVerifier {
    /// A verifier loaded with the built-in schemas.
    pub fn new() -> VitalsResult<Self> {
        let mut verifier = Self {
            validators: HashMap::new(),
        };
        verifier.register(RequestKind::CreatePatient, schemas::create_patient())?;
        verifier.register(RequestKind::UpdatePatient, schemas::update_patient())?;
        verifier.register(RequestKind::PremiumInput, schemas::premium_input())?;
        Ok(verifier)
    }

    /// Compile `schema` and use it for `kind` from now on.
    ///
    /// A schema that does not compile is a `ConfigError`, and the previous
    /// schema for `kind` stays in place.
    pub fn register(&mut self, kind: RequestKind, schema: Value) -> VitalsResult<()> {
        let validator = jsonschema::validator_for(&schema).map_err(|e| VitalsError::ConfigError {
            reason: format!("invalid JSON Schema for {kind:?}: {e}"),
        })?;
        self.validators.insert(kind, validator);
        Ok(())
    }

    /// The top-level field a schema error refers to.
    ///
    /// Missing required properties are reported against the property name;
    /// everything else against the first segment of the instance path.
    /// Errors on the body itself report `"body"`.
    fn field_of(error: &jsonschema::ValidationError<'_>) -> String {
        if let ValidationErrorKind::Required { property } = &error.kind {
            if let Some(name) = property.as_str() {
                return name.to_string();
            }
        }
        let path = error.instance_path.to_string();
        path.trim_start_matches('/')
            .split('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("body")
            .to_string()
    }
}

impl RequestVerifier for SchemaVerifier {
    /// Validate `body` against the schema for `kind`.
    ///
    /// All violations are collected; the caller decides whether to report
    /// one or all of them.
    fn verify(&self, kind: RequestKind, body: &Value) -> VitalsResult<ValidationReport> {
        let validator = self.validators.get(&kind).ok_or_else(|| VitalsError::ConfigError {
            reason: format!("no request schema registered for {kind:?}"),
        })?;

        let violations: Vec<FieldViolation> = validator
            .iter_errors(body)
            .map(|error| FieldViolation {
                field: Self::field_of(&error),
                reason: error.to_string(),
            })
            .collect();

        if violations.is_empty() {
            debug!(kind = ?kind, "request body passed schema validation");
        } else {
            warn!(
                kind = ?kind,
                count = violations.len(),
                fields = ?violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>(),
                "request body failed schema validation"
            );
        }

        Ok(ValidationReport::from_violations(violations))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use vitals_contracts::{
        error::VitalsError,
        verify::{RequestKind, ValidationReport},
    };
    use vitals_core::traits::RequestVerifier;

    use super::SchemaVerifier;

    fn verify(kind: RequestKind, body: serde_json::Value) -> ValidationReport {
        SchemaVerifier::new().unwrap().verify(kind, &body).unwrap()
    }

    fn fields(report: &ValidationReport) -> Vec<String> {
        let mut f: Vec<String> = report.violations.iter().map(|v| v.field.clone()).collect();
        f.sort();
        f
    }

    fn valid_create() -> serde_json::Value {
        json!({
            "id": "P001", "name": "Ravi", "city": "Pune", "age": 30,
            "gender": "others", "height": 1.75, "weight": 70.0
        })
    }

    // ── Create ────────────────────────────────────────────────────────────────

    #[test]
    fn test_valid_create_passes() {
        let report = verify(RequestKind::CreatePatient, valid_create());
        assert!(report.passed, "unexpected violations: {:?}", report.violations);
    }

    #[test]
    fn test_create_missing_fields_reported_by_name() {
        let report = verify(RequestKind::CreatePatient, json!({ "id": "P001", "name": "Ravi" }));
        assert!(!report.passed);
        assert_eq!(fields(&report), vec!["age", "city", "gender", "height", "weight"]);
    }

    #[test]
    fn test_create_collects_every_violation() {
        let mut body = valid_create();
        body["age"] = json!(200);
        body["height"] = json!(0);
        body["gender"] = json!("unknown");
        let report = verify(RequestKind::CreatePatient, body);
        assert_eq!(fields(&report), vec!["age", "gender", "height"]);
    }

    #[test]
    fn test_non_object_body_reported_against_body() {
        let report = verify(RequestKind::CreatePatient, json!([1, 2, 3]));
        assert_eq!(fields(&report), vec!["body"]);
    }

    // ── Update ────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_update_passes() {
        assert!(verify(RequestKind::UpdatePatient, json!({})).passed);
    }

    #[test]
    fn test_update_rejects_others_gender() {
        let report = verify(RequestKind::UpdatePatient, json!({ "gender": "others" }));
        assert_eq!(fields(&report), vec!["gender"]);
    }

    #[test]
    fn test_update_rejects_null_and_out_of_range() {
        let report = verify(RequestKind::UpdatePatient, json!({ "city": null, "age": 200 }));
        assert_eq!(fields(&report), vec!["age", "city"]);
    }

    // ── Premium ───────────────────────────────────────────────────────────────

    #[test]
    fn test_premium_input() {
        let ok = json!({
            "age": 30, "weight": 65.0, "height": 1.7, "income_lpa": 10.0,
            "smoker": false, "city": "Mumbai", "occupation": "private_job"
        });
        assert!(verify(RequestKind::PremiumInput, ok.clone()).passed);

        let mut bad = ok;
        bad["height"] = json!(2.6);
        bad["occupation"] = json!("astronaut");
        let report = verify(RequestKind::PremiumInput, bad);
        assert_eq!(fields(&report), vec!["height", "occupation"]);
    }

    // ── Configuration errors ──────────────────────────────────────────────────

    #[test]
    fn test_malformed_schema_rejected_at_registration() {
        let mut verifier = SchemaVerifier::new().unwrap();
        assert!(matches!(
            verifier.register(RequestKind::UpdatePatient, json!({ "type": 12 })),
            Err(VitalsError::ConfigError { .. })
        ));
        // The built-in update schema is still the one in force.
        let report = verifier
            .verify(RequestKind::UpdatePatient, &json!({ "gender": "others" }))
            .unwrap();
        assert_eq!(fields(&report), vec!["gender"]);
    }

    #[test]
    fn test_registered_schema_is_reused_across_requests() {
        let mut verifier = SchemaVerifier::new().unwrap();
        verifier
            .register(
                RequestKind::UpdatePatient,
                json!({ "type": "object", "required": ["reason"] }),
            )
            .unwrap();
        for _ in 0..3 {
            let report = verifier.verify(RequestKind::UpdatePatient, &json!({})).unwrap();
            assert_eq!(fields(&report), vec!["reason"]);
        }
        assert!(verifier
            .verify(RequestKind::UpdatePatient, &json!({ "reason": "follow-up" }))
            .unwrap()
            .passed);
    }
}
