//! Feature derivation for the premium model.
//!
//! The model never sees raw age, height, weight, smoker or city values.
//! They are folded into bmi, an age group, a lifestyle risk level and a
//! city tier here.

use tracing::debug;

use vitals_contracts::{
    error::VitalsResult,
    premium::{AgeGroup, CityTier, LifestyleRisk, PremiumFeatures, PremiumInput},
};

/// Cities known to be tier 1 or tier 2. Everything else is tier 3.
///
/// Names are compared after normalization, so the lists may be written in
/// any case.
#[derive(Debug, Clone, Default)]
pub struct CityTiers {
    tier_1: Vec<String>,
    tier_2: Vec<String>,
}

impl CityTiers {
    pub fn new<I, J, S, T>(tier_1: I, tier_2: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            tier_1: tier_1.into_iter().map(|c| normalize_city(c.as_ref())).collect(),
            tier_2: tier_2.into_iter().map(|c| normalize_city(c.as_ref())).collect(),
        }
    }

    /// Tier of an already-normalized city name.
    pub fn tier_of(&self, city: &str) -> CityTier {
        if self.tier_1.iter().any(|c| c == city) {
            CityTier(1)
        } else if self.tier_2.iter().any(|c| c == city) {
            CityTier(2)
        } else {
            CityTier(3)
        }
    }
}

/// Trim and title-case a city name: `"  new delhi "` → `"New Delhi"`.
pub fn normalize_city(city: &str) -> String {
    city.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn age_group(age: i64) -> AgeGroup {
    if age < 25 {
        AgeGroup::Young
    } else if age < 45 {
        AgeGroup::Adult
    } else if age < 60 {
        AgeGroup::MiddleAged
    } else {
        AgeGroup::Senior
    }
}

pub fn lifestyle_risk(smoker: bool, bmi: f64) -> LifestyleRisk {
    if smoker && bmi > 30.0 {
        LifestyleRisk::High
    } else if smoker || bmi > 27.0 {
        LifestyleRisk::Medium
    } else {
        LifestyleRisk::Low
    }
}

/// Validate `input` and derive the model's feature row from it.
pub fn derive_features(input: &PremiumInput, tiers: &CityTiers) -> VitalsResult<PremiumFeatures> {
    input.validate()?;

    let bmi = input.weight / (input.height * input.height);
    let city = normalize_city(&input.city);
    let features = PremiumFeatures {
        bmi,
        age_group: age_group(input.age),
        lifestyle_risk: lifestyle_risk(input.smoker, bmi),
        city_tier: tiers.tier_of(&city),
        income_lpa: input.income_lpa,
        occupation: input.occupation,
    };

    debug!(
        city = %city,
        tier = features.city_tier.0,
        age_group = ?features.age_group,
        lifestyle_risk = ?features.lifestyle_risk,
        "premium features derived"
    );
    Ok(features)
}
