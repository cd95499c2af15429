//! Configuration types for lattice assembly.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file. Missing sections and fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! # use beamline::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.assembly().max_drift_length(), 1.0);
//! ```

use serde::Deserialize;

/// Default upper bound on drift and part lengths, in lattice length units.
pub const DEFAULT_MAX_DRIFT_LENGTH: f64 = 1.0;

fn default_max_drift_length() -> f64 {
    DEFAULT_MAX_DRIFT_LENGTH
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Assembly configuration section.
    #[serde(default)]
    assembly: AssemblyConfig,
}

impl AppConfig {
    pub fn new(assembly: AssemblyConfig) -> Self {
        Self { assembly }
    }

    /// Returns the assembly configuration.
    pub fn assembly(&self) -> &AssemblyConfig {
        &self.assembly
    }

    /// Replace the maximum drift length, keeping everything else.
    pub fn with_max_drift_length(mut self, max_drift_length: f64) -> Self {
        self.assembly.max_drift_length = max_drift_length;
        self
    }
}

/// Settings that control how sequences are assembled.
///
/// The value is checked when an [`Assembler`](crate::assembly::Assembler) is
/// created from it, not when it is deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblyConfig {
    /// Maximum length of a synthesized drift and of a thick element's parts.
    #[serde(default = "default_max_drift_length")]
    max_drift_length: f64,
}

impl AssemblyConfig {
    pub fn new(max_drift_length: f64) -> Self {
        Self { max_drift_length }
    }

    pub fn max_drift_length(&self) -> f64 {
        self.max_drift_length
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DRIFT_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_override_max_drift_length() {
        let config = AppConfig::default().with_max_drift_length(0.25);
        assert_approx_eq!(f64, config.assembly().max_drift_length(), 0.25);
    }

    #[test]
    fn test_default_max_drift_length() {
        assert_approx_eq!(
            f64,
            AssemblyConfig::default().max_drift_length(),
            DEFAULT_MAX_DRIFT_LENGTH
        );
    }
}
