//! Configuration schema.
//!
//! Every section and every field has a default, so an empty TOML document
//! is a valid configuration.
//!
//! Example:
//! ```toml
//! [app]
//! about = "Patient records for the outpatient clinic"
//!
//! [store]
//! path = "data/patients.json"
//! consistency = "serialized"
//! create_if_missing = true
//!
//! [premium]
//! model_version = "1.0.0"
//! tier_1_cities = ["Mumbai", "Delhi"]
//! tier_2_cities = ["Jaipur", "Indore"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vitals_core::ConsistencyMode;

const TIER_1_CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata", "Hyderabad", "Pune",
];

const TIER_2_CITIES: &[&str] = &[
    "Jaipur", "Chandigarh", "Indore", "Lucknow", "Patna", "Ranchi", "Visakhapatnam",
    "Coimbatore", "Bhopal", "Nagpur", "Vadodara", "Surat", "Rajkot", "Jodhpur", "Raipur",
    "Amritsar", "Varanasi", "Agra", "Dehradun", "Mysore", "Jabalpur", "Guwahati",
    "Thiruvananthapuram", "Ludhiana", "Nashik", "Allahabad", "Udaipur", "Aurangabad", "Hubli",
    "Belgaum", "Salem", "Vijayawada", "Tiruchirappalli", "Bhavnagar", "Gwalior", "Dhanbad",
    "Bareilly", "Aligarh", "Gaya", "Kozhikode", "Warangal", "Kolhapur", "Bilaspur",
    "Jalandhar", "Noida", "Guntur", "Asansol", "Siliguri",
];

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub premium: PremiumConfig,
}

/// Text served by the informational endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Body of `GET /about`.
    pub about: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            about: "A fully functional API to manage your patient records".to_string(),
        }
    }
}

/// Where patient records live and how writers coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Path of the JSON patient file.
    pub path: PathBuf,
    /// `last-write-wins`, `serialized` or `optimistic`.
    pub consistency: ConsistencyMode,
    /// Write an empty collection if `path` does not exist yet.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("patients.json"),
            consistency: ConsistencyMode::default(),
            create_if_missing: true,
        }
    }
}

/// Premium predictor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PremiumConfig {
    /// Reported by `GET /health`.
    pub model_version: String,
    pub tier_1_cities: Vec<String>,
    pub tier_2_cities: Vec<String>,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            model_version: "1.0.0".to_string(),
            tier_1_cities: TIER_1_CITIES.iter().map(|c| c.to_string()).collect(),
            tier_2_cities: TIER_2_CITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}
