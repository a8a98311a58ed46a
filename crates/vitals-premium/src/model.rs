//! `ScorecardModel`: the reference premium classifier.
//!
//! Each feature contributes a fixed number of points. The total is compared
//! against one centre per category and a softmax over the negative squared
//! distances gives the class probabilities. Same features, same answer.

use std::collections::BTreeMap;

use tracing::debug;

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    premium::{
        AgeGroup, LifestyleRisk, Occupation, Prediction, PremiumCategory, PremiumFeatures,
    },
};
use vitals_core::traits::PremiumModel;

const CENTRES: [(PremiumCategory, f64); 3] = [
    (PremiumCategory::Low, 1.0),
    (PremiumCategory::Medium, 3.5),
    (PremiumCategory::High, 6.0),
];

const TEMPERATURE: f64 = 2.0;

pub struct ScorecardModel {
    version: String,
}

impl ScorecardModel {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Additive risk score for one feature row.
    pub fn score(features: &PremiumFeatures) -> f64 {
        let bmi = if features.bmi < 18.5 {
            0.5
        } else if features.bmi < 25.0 {
            0.0
        } else if features.bmi < 30.0 {
            1.0
        } else {
            2.0
        };

        let age = match features.age_group {
            AgeGroup::Young => 0.0,
            AgeGroup::Adult => 0.5,
            AgeGroup::MiddleAged => 1.5,
            AgeGroup::Senior => 2.5,
        };

        let lifestyle = match features.lifestyle_risk {
            LifestyleRisk::Low => 0.0,
            LifestyleRisk::Medium => 1.5,
            LifestyleRisk::High => 3.0,
        };

        let city = match features.city_tier.0 {
            1 => 1.0,
            2 => 0.5,
            _ => 0.0,
        };

        let income = if features.income_lpa > 25.0 {
            1.0
        } else if features.income_lpa > 10.0 {
            0.5
        } else {
            0.0
        };

        let occupation = match features.occupation {
            Occupation::Retired => 1.0,
            Occupation::Unemployed | Occupation::BusinessOwner => 0.5,
            Occupation::Freelancer | Occupation::PrivateJob => 0.0,
            Occupation::GovernmentJob | Occupation::Student => -0.5,
        };

        bmi + age + lifestyle + city + income + occupation
    }
}

impl PremiumModel for ScorecardModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, features: &PremiumFeatures) -> VitalsResult<Prediction> {
        let score = Self::score(features);
        if !score.is_finite() {
            return Err(VitalsError::ModelError {
                reason: format!("non-finite score for features {features:?}"),
            });
        }

        let logits: Vec<f64> = CENTRES
            .iter()
            .map(|(_, centre)| -(score - centre).powi(2) / TEMPERATURE)
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let mut best = (PremiumCategory::Low, f64::NEG_INFINITY);
        let mut probabilities = BTreeMap::new();
        for ((category, _), e) in CENTRES.iter().zip(&exps) {
            let p = e / total;
            if p > best.1 {
                best = (*category, p);
            }
            probabilities.insert(category.to_string(), round4(p));
        }

        debug!(score, category = %best.0, "premium predicted");
        Ok(Prediction {
            predicted_category: best.0.to_string(),
            class_probabilities: Some(probabilities),
        })
    }
}

fn round4(x: f64) -> f64 {
    format!("{x:.4}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use vitals_contracts::premium::{
        AgeGroup, CityTier, LifestyleRisk, Occupation, PremiumFeatures,
    };
    use vitals_core::traits::PremiumModel;

    use super::ScorecardModel;

    fn features(
        bmi: f64,
        age_group: AgeGroup,
        lifestyle_risk: LifestyleRisk,
        tier: u8,
        income_lpa: f64,
        occupation: Occupation,
    ) -> PremiumFeatures {
        PremiumFeatures {
            bmi,
            age_group,
            lifestyle_risk,
            city_tier: CityTier(tier),
            income_lpa,
            occupation,
        }
    }

    fn category(f: &PremiumFeatures) -> String {
        ScorecardModel::new("test").predict(f).unwrap().predicted_category
    }

    #[test]
    fn young_healthy_student_is_low() {
        let f = features(22.0, AgeGroup::Young, LifestyleRisk::Low, 3, 2.0, Occupation::Student);
        assert_eq!(category(&f), "Low");
    }

    #[test]
    fn moderate_profile_is_medium() {
        let f = features(
            28.0,
            AgeGroup::Adult,
            LifestyleRisk::Medium,
            2,
            15.0,
            Occupation::PrivateJob,
        );
        assert_eq!(ScorecardModel::score(&f), 4.0);
        assert_eq!(category(&f), "Medium");
    }

    #[test]
    fn senior_obese_smoker_is_high() {
        let f = features(33.0, AgeGroup::Senior, LifestyleRisk::High, 1, 30.0, Occupation::Retired);
        assert_eq!(category(&f), "High");
    }

    #[test]
    fn probabilities_cover_every_class_and_sum_to_one() {
        let model = ScorecardModel::new("1.0.0");
        let f = features(
            26.0,
            AgeGroup::MiddleAged,
            LifestyleRisk::Low,
            1,
            8.0,
            Occupation::Freelancer,
        );
        let prediction = model.predict(&f).unwrap();
        let probs = prediction.class_probabilities.clone().unwrap();

        assert_eq!(probs.len(), 3);
        let total: f64 = probs.values().sum();
        assert!((total - 1.0).abs() < 1e-3, "sum was {total}");

        let confidence = prediction.confidence().unwrap();
        assert!(probs.values().all(|p| *p <= confidence));
        assert_eq!(model.version(), "1.0.0");
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = ScorecardModel::new("1.0.0");
        let f = features(24.0, AgeGroup::Adult, LifestyleRisk::Medium, 2, 12.0, Occupation::Unemployed);
        assert_eq!(model.predict(&f).unwrap(), model.predict(&f).unwrap());
    }
}
