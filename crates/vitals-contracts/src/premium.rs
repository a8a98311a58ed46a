//! Insurance premium prediction types.
//!
//! `PremiumInput` is the validated request body. `PremiumFeatures` is what
//! the model actually sees: derived values replace the raw age, height,
//! weight, smoker, and city fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{VitalsError, VitalsResult};
use crate::patient::MAX_AGE;

/// Exclusive upper bound on height accepted by the premium service, in metres.
pub const MAX_PREMIUM_HEIGHT: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupation {
    Retired,
    Freelancer,
    Student,
    GovernmentJob,
    BusinessOwner,
    Unemployed,
    PrivateJob,
}

/// Raw user input to the premium predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumInput {
    pub age: i64,
    /// Kilograms.
    pub weight: f64,
    /// Metres.
    pub height: f64,
    /// Annual income in lakh rupees.
    pub income_lpa: f64,
    pub smoker: bool,
    pub city: String,
    pub occupation: Occupation,
}

impl PremiumInput {
    pub fn validate(&self) -> VitalsResult<()> {
        if self.age <= 0 || self.age >= MAX_AGE {
            return Err(VitalsError::invalid(
                "age",
                format!("must be greater than 0 and less than {MAX_AGE}, got {}", self.age),
            ));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(VitalsError::invalid("weight", "must be greater than 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0 && self.height < MAX_PREMIUM_HEIGHT) {
            return Err(VitalsError::invalid(
                "height",
                format!("must be greater than 0 and less than {MAX_PREMIUM_HEIGHT}"),
            ));
        }
        if !(self.income_lpa.is_finite() && self.income_lpa > 0.0) {
            return Err(VitalsError::invalid("income_lpa", "must be greater than 0"));
        }
        if self.city.trim().is_empty() {
            return Err(VitalsError::invalid("city", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Young,
    Adult,
    MiddleAged,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifestyleRisk {
    Low,
    Medium,
    High,
}

/// City tier, 1 (largest metros) through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityTier(pub u8);

/// The feature row handed to a premium model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumFeatures {
    /// Unrounded `weight / height²`.
    pub bmi: f64,
    pub age_group: AgeGroup,
    pub lifestyle_risk: LifestyleRisk,
    pub city_tier: CityTier,
    pub income_lpa: f64,
    pub occupation: Occupation,
}

/// Premium category labels produced by the reference model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PremiumCategory {
    Low,
    Medium,
    High,
}

impl fmt::Display for PremiumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PremiumCategory::Low => "Low",
            PremiumCategory::Medium => "Medium",
            PremiumCategory::High => "High",
        };
        f.write_str(s)
    }
}

/// What a model returns for one feature row.
///
/// Models that cannot report probabilities leave `class_probabilities` as
/// `None`; the response then carries a null confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_category: String,
    pub class_probabilities: Option<BTreeMap<String, f64>>,
}

impl Prediction {
    /// Probability assigned to the predicted class, if the model reported one.
    pub fn confidence(&self) -> Option<f64> {
        self.class_probabilities
            .as_ref()
            .and_then(|p| p.get(&self.predicted_category).copied())
    }
}

/// Body of a successful `/predict` response, under the `response` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_category: String,
    pub confidence: Option<f64>,
    pub class_probabilities: BTreeMap<String, f64>,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        let confidence = prediction.confidence();
        Self {
            predicted_category: prediction.predicted_category,
            confidence,
            class_probabilities: prediction.class_probabilities.unwrap_or_default(),
        }
    }
}
