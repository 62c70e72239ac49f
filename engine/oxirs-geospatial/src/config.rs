//! Engine configuration
//!
//! Configuration is plain data: it can be built in code, deserialized from
//! TOML, and overridden from environment variables.

use crate::error::{Result, SpatialError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decimal digits kept after every coordinate transform
pub const DEFAULT_COORDINATE_PRECISION: u32 = 8;

/// Largest precision `f64` can carry meaningfully
const MAX_COORDINATE_PRECISION: u32 = 15;

/// Configuration for projection and analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Decimal digits kept after each forward or inverse transform
    pub coordinate_precision: u32,
    /// Upper bound on entities returned by registry-scanning queries
    pub max_relation_candidates: Option<usize>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
            max_relation_candidates: None,
        }
    }
}

impl SpatialConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Examples
    ///
    /// ```
    /// use oxirs_geospatial::config::SpatialConfig;
    ///
    /// let config = SpatialConfig::from_toml_str("coordinate_precision = 6").unwrap();
    /// assert_eq!(config.coordinate_precision, 6);
    /// assert_eq!(config.max_relation_candidates, None);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SpatialConfig = toml::from_str(content)
            .map_err(|e| SpatialError::ConfigError(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SpatialError::ConfigError(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Override fields from `<PREFIX>_COORDINATE_PRECISION` and
    /// `<PREFIX>_MAX_RELATION_CANDIDATES`
    pub fn apply_env(mut self, prefix: &str) -> Result<Self> {
        if let Ok(value) = std::env::var(format!("{prefix}_COORDINATE_PRECISION")) {
            self.coordinate_precision = value.trim().parse().map_err(|_| {
                SpatialError::ConfigError(format!(
                    "{prefix}_COORDINATE_PRECISION must be an unsigned integer, got {value:?}"
                ))
            })?;
        }

        if let Ok(value) = std::env::var(format!("{prefix}_MAX_RELATION_CANDIDATES")) {
            let value = value.trim();
            self.max_relation_candidates = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.parse().map_err(|_| {
                    SpatialError::ConfigError(format!(
                        "{prefix}_MAX_RELATION_CANDIDATES must be an unsigned integer, got {value:?}"
                    ))
                })?)
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(SpatialError::ConfigError(format!(
                "coordinate_precision must be at most {MAX_COORDINATE_PRECISION}, got {}",
                self.coordinate_precision
            )));
        }
        if self.max_relation_candidates == Some(0) {
            return Err(SpatialError::ConfigError(
                "max_relation_candidates must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_precision() {
        let config = SpatialConfig::default();
        assert_eq!(config.coordinate_precision, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = SpatialConfig::from_toml_str(
            r#"
            coordinate_precision = 10
            max_relation_candidates = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.coordinate_precision, 10);
        assert_eq!(config.max_relation_candidates, Some(25));
    }

    #[test]
    fn test_invalid_precision_rejected() {
        let result = SpatialConfig::from_toml_str("coordinate_precision = 20");
        assert!(matches!(result, Err(SpatialError::ConfigError(_))));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("OXIRS_GEO_TEST_COORDINATE_PRECISION", "6");
        std::env::set_var("OXIRS_GEO_TEST_MAX_RELATION_CANDIDATES", "3");

        let config = SpatialConfig::default()
            .apply_env("OXIRS_GEO_TEST")
            .unwrap();
        assert_eq!(config.coordinate_precision, 6);
        assert_eq!(config.max_relation_candidates, Some(3));

        std::env::remove_var("OXIRS_GEO_TEST_COORDINATE_PRECISION");
        std::env::remove_var("OXIRS_GEO_TEST_MAX_RELATION_CANDIDATES");
    }
}
