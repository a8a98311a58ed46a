//! # vitals-config
//!
//! TOML configuration for the Vitals services.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use vitals_config::ServiceConfig;
//!
//! let config = ServiceConfig::from_file(Path::new("config/vitals.toml"))?;
//! ```
//!
//! Missing sections and fields take their defaults. Unknown keys are
//! rejected so a typo does not silently fall back to a default.

pub mod loader;
pub mod settings;

pub use settings::{AppConfig, PremiumConfig, ServiceConfig, StoreConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
