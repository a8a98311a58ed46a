//! JSON Schemas for every request body.
//!
//! These mirror the constraints `PatientAttributes::validate` and
//! `PremiumInput::validate` enforce on typed values.

use serde_json::{json, Value};

fn patient_properties(genders: &[&str]) -> Value {
    json!({
        "name":   { "type": "string", "minLength": 1, "pattern": "\\S" },
        "city":   { "type": "string" },
        "age":    { "type": "integer", "exclusiveMinimum": 0, "exclusiveMaximum": 120 },
        "gender": { "type": "string", "enum": genders },
        "height": { "type": "number", "exclusiveMinimum": 0 },
        "weight": { "type": "number", "exclusiveMinimum": 0 }
    })
}

/// `POST /create`: an id plus every patient attribute.
pub fn create_patient() -> Value {
    let mut properties = patient_properties(&["male", "female", "others"]);
    properties["id"] = json!({ "type": "string", "minLength": 1, "pattern": "\\S" });
    json!({
        "type": "object",
        "required": ["id", "name", "city", "age", "gender", "height", "weight"],
        "properties": properties
    })
}

/// `PUT /edit/{id}`: any subset of patient attributes.
///
/// `gender` excludes `others` here, matching `UpdateGender`.
pub fn update_patient() -> Value {
    json!({
        "type": "object",
        "properties": patient_properties(&["male", "female"])
    })
}

/// `POST /predict`.
pub fn premium_input() -> Value {
    json!({
        "type": "object",
        "required": ["age", "weight", "height", "income_lpa", "smoker", "city", "occupation"],
        "properties": {
            "age":        { "type": "integer", "exclusiveMinimum": 0, "exclusiveMaximum": 120 },
            "weight":     { "type": "number", "exclusiveMinimum": 0 },
            "height":     { "type": "number", "exclusiveMinimum": 0, "exclusiveMaximum": 2.5 },
            "income_lpa": { "type": "number", "exclusiveMinimum": 0 },
            "smoker":     { "type": "boolean" },
            "city":       { "type": "string", "minLength": 1, "pattern": "\\S" },
            "occupation": {
                "type": "string",
                "enum": [
                    "retired", "freelancer", "student", "government_job",
                    "business_owner", "unemployed", "private_job"
                ]
            }
        }
    })
}
