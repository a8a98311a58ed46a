//! Patient record types.
//!
//! A `PatientRecord` is always materialized through `PatientRecord::new`,
//! which validates the six settable attributes and derives `bmi` and
//! `verdict` from height and weight. Deserialization goes through the same
//! constructor, so derived values found in stored JSON are discarded and
//! recomputed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{VitalsError, VitalsResult};

/// Exclusive upper bound on a patient's age, in years.
pub const MAX_AGE: i64 = 120;

/// A patient's gender as stored on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        };
        f.write_str(s)
    }
}

/// Categorical label derived from a rounded BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obesity")]
    Obesity,
}

impl Verdict {
    /// Bucket a BMI value.
    ///
    /// Boundaries are taken literally: Normal is `[18.5, 24.9)` and
    /// Overweight is `[25, 29.9)`. Values in `[24.9, 25)` and `[29.9, 30)`
    /// match neither branch and land in `Obesity`.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 24.9 {
            Verdict::NormalWeight
        } else if (25.0..29.9).contains(&bmi) {
            Verdict::Overweight
        } else {
            Verdict::Obesity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::NormalWeight => "Normal weight",
            Verdict::Overweight => "Overweight",
            Verdict::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to the nearest two-decimal value.
///
/// Rounds the exact binary value, so `22.825` (stored just below) becomes
/// `22.82`; a true tie rounds to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// `weight / height²`, rounded to two decimal places.
pub fn compute_bmi(height_m: f64, weight_kg: f64) -> f64 {
    round2(weight_kg / (height_m * height_m))
}

/// The settable attributes of a patient.
///
/// This is the plain working copy the update engine merges into. It carries
/// no derived values and is not guaranteed valid until passed through
/// `PatientRecord::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAttributes {
    pub name: String,
    pub city: String,
    pub age: i64,
    pub gender: Gender,
    /// Metres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
}

impl PatientAttributes {
    /// Check every field constraint, reporting the first violation.
    pub fn validate(&self) -> VitalsResult<()> {
        if self.name.trim().is_empty() {
            return Err(VitalsError::invalid("name", "must not be empty"));
        }
        if self.age <= 0 || self.age >= MAX_AGE {
            return Err(VitalsError::invalid(
                "age",
                format!("must be greater than 0 and less than {MAX_AGE}, got {}", self.age),
            ));
        }
        check_positive("height", self.height)?;
        check_positive("weight", self.weight)?;
        Ok(())
    }
}

fn check_positive(field: &str, value: f64) -> VitalsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VitalsError::invalid(
            field,
            format!("must be a finite number greater than 0, got {value}"),
        ))
    }
}

/// A validated patient with its derived BMI and verdict.
///
/// The id is not part of the record; it is the key under which the record
/// lives in a [`Collection`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PatientAttributes")]
pub struct PatientRecord {
    attributes: PatientAttributes,
    bmi: f64,
    verdict: Verdict,
}

impl PatientRecord {
    /// Validate `attributes` and derive bmi and verdict from them.
    pub fn new(attributes: PatientAttributes) -> VitalsResult<Self> {
        attributes.validate()?;
        let bmi = compute_bmi(attributes.height, attributes.weight);
        if !bmi.is_finite() {
            return Err(VitalsError::invalid(
                "height",
                format!(
                    "bmi for height {} and weight {} is not a finite number",
                    attributes.height, attributes.weight
                ),
            ));
        }
        Ok(Self {
            verdict: Verdict::from_bmi(bmi),
            bmi,
            attributes,
        })
    }

    pub fn attributes(&self) -> &PatientAttributes {
        &self.attributes
    }

    /// Consume the record, keeping only its settable attributes.
    pub fn into_attributes(self) -> PatientAttributes {
        self.attributes
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn city(&self) -> &str {
        &self.attributes.city
    }

    pub fn age(&self) -> i64 {
        self.attributes.age
    }

    pub fn gender(&self) -> Gender {
        self.attributes.gender
    }

    pub fn height(&self) -> f64 {
        self.attributes.height
    }

    pub fn weight(&self) -> f64 {
        self.attributes.weight
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}

impl TryFrom<PatientAttributes> for PatientRecord {
    type Error = VitalsError;

    fn try_from(attributes: PatientAttributes) -> VitalsResult<Self> {
        PatientRecord::new(attributes)
    }
}

/// Serialized layout: the six attributes followed by `bmi` and `verdict`.
#[derive(Serialize)]
struct PatientView<'a> {
    #[serde(flatten)]
    attributes: &'a PatientAttributes,
    bmi: f64,
    verdict: Verdict,
}

impl Serialize for PatientRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PatientView {
            attributes: &self.attributes,
            bmi: self.bmi,
            verdict: self.verdict,
        }
        .serialize(serializer)
    }
}

/// Every stored patient, keyed by id.
///
/// `BTreeMap` keeps serialization order stable, which the collection
/// version digest relies on.
pub type Collection = BTreeMap<String, PatientRecord>;
