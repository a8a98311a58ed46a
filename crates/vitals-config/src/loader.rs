//! Loading and checking a `ServiceConfig`.

use std::path::Path;

use tracing::{debug, warn};

use vitals_contracts::error::{VitalsError, VitalsResult};

use crate::settings::ServiceConfig;

impl ServiceConfig {
    /// Parse `s` as TOML and check the result.
    ///
    /// Returns `VitalsError::ConfigError` if the TOML is malformed, has
    /// unknown keys, or fails `validate`.
    pub fn from_toml_str(s: &str) -> VitalsResult<Self> {
        let config: ServiceConfig = toml::from_str(s).map_err(|e| VitalsError::ConfigError {
            reason: format!("failed to parse service config TOML: {e}"),
        })?;
        config.validate()?;
        debug!(
            store_path = %config.store.path.display(),
            consistency = ?config.store.consistency,
            model_version = %config.premium.model_version,
            "service config loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it with `from_toml_str`.
    pub fn from_file(path: &Path) -> VitalsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VitalsError::ConfigError {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> VitalsResult<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(VitalsError::ConfigError {
                reason: "store.path must not be empty".to_string(),
            });
        }
        if self.premium.model_version.trim().is_empty() {
            return Err(VitalsError::ConfigError {
                reason: "premium.model_version must not be empty".to_string(),
            });
        }
        if let Some(city) = self
            .premium
            .tier_1_cities
            .iter()
            .find(|c| self.premium.tier_2_cities.contains(c))
        {
            warn!(city = %city, "city listed in both tiers");
            return Err(VitalsError::ConfigError {
                reason: format!("city '{city}' is listed in both tier_1_cities and tier_2_cities"),
            });
        }
        Ok(())
    }
}
