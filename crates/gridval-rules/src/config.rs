//! Validation settings.
//!
//! Settings can be built in code or read from a TOML file:
//!
//! ```toml
//! calculation_type = "state_estimation"
//! symmetric = false
//! ```
//!
//! Omitted keys take their defaults: no calculation type (check everything)
//! and a symmetric calculation.

use std::path::Path;

use anyhow::{Context, Result};
use gridval_core::CalculationType;
use serde::{Deserialize, Serialize};

/// What the data will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Target calculation; `None` applies every calculation's rules.
    pub calculation_type: Option<CalculationType>,

    /// Symmetric (balanced) calculation.
    pub symmetric: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            calculation_type: None,
            symmetric: true,
        }
    }
}

impl ValidationConfig {
    pub fn new(calculation_type: Option<CalculationType>, symmetric: bool) -> Self {
        Self {
            calculation_type,
            symmetric,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("parsing validation config")
    }

    /// Load settings from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading validation config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading validation config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_keys_omitted() {
        let config = ValidationConfig::from_toml_str("").unwrap();
        assert_eq!(config, ValidationConfig::default());
        assert!(config.symmetric);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "calculation_type = \"short_circuit\"").unwrap();
        writeln!(file, "symmetric = false").unwrap();

        let config = ValidationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.calculation_type, Some(CalculationType::ShortCircuit));
        assert!(!config.symmetric);
    }

    #[test]
    fn test_unknown_calculation_is_rejected() {
        let err = ValidationConfig::from_toml_str("calculation_type = \"optimal\"").unwrap_err();
        assert!(err.to_string().contains("validation config"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = ValidationConfig::from_path("/nonexistent/gridval.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/gridval.toml"));
    }
}
