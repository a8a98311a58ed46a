//! # vitals-premium
//!
//! Insurance premium category prediction.
//!
//! [`features::derive_features`] turns a validated [`PremiumInput`] into the
//! [`PremiumFeatures`] row a model consumes. [`model::ScorecardModel`] is a
//! deterministic reference implementation of
//! [`vitals_core::traits::PremiumModel`]; a trained classifier can be
//! swapped in behind the same trait.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use vitals_core::traits::PremiumModel;
//! use vitals_premium::{derive_features, CityTiers, ScorecardModel};
//!
//! let tiers = CityTiers::new(["Mumbai", "Delhi"], ["Jaipur"]);
//! let features = derive_features(&input, &tiers)?;
//! let prediction = ScorecardModel::new("1.0.0").predict(&features)?;
//! ```
//!
//! [`PremiumInput`]: vitals_contracts::premium::PremiumInput
//! [`PremiumFeatures`]: vitals_contracts::premium::PremiumFeatures

pub mod features;
pub mod model;

pub use features::{derive_features, normalize_city, CityTiers};
pub use model::ScorecardModel;
