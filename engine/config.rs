use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// --- Public Data Structures ---
// These structs define the human-readable TOML format of a calculator configuration.
// Reference data (age bands, the test catalog) is compiled in and never read from here.

/// Cut-offs used to interpret a post-test probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// A positive result at or above this probability is treated as confirming the diagnosis.
    pub rule_in: f64,
    /// A negative result at or below this probability is treated as ruling it out.
    pub rule_out: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            rule_in: 0.95,
            rule_out: 0.015,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub probability_decimals: usize,
    pub ratio_decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            probability_decimals: 1,
            ratio_decimals: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub thresholds: DecisionThresholds,
    pub display: DisplayConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error(
        "Invalid decision thresholds: need 0 < rule_out ({rule_out}) < rule_in ({rule_in}) < 1."
    )]
    InvalidThresholds { rule_in: f64, rule_out: f64 },
}

impl CalculatorConfig {
    /// Loads and validates a configuration. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml_string = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&toml_string)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(toml_string: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_string)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let DecisionThresholds { rule_in, rule_out } = self.thresholds;
        let ordered = rule_out > 0.0 && rule_out < rule_in && rule_in < 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThresholds { rule_in, rule_out });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_published_cutoffs() {
        let config = CalculatorConfig::default();
        assert_eq!(config.thresholds.rule_in, 0.95);
        assert_eq!(config.thresholds.rule_out, 0.015);
        assert_eq!(config.display.probability_decimals, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config = CalculatorConfig::from_toml_str("[thresholds]\nrule_in = 0.9\n").unwrap();
        assert_eq!(config.thresholds.rule_in, 0.9);
        assert_eq!(config.thresholds.rule_out, 0.015);
        assert_eq!(config.display, DisplayConfig::default());

        let empty = CalculatorConfig::from_toml_str("").unwrap();
        assert_eq!(empty, CalculatorConfig::default());
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let text = CalculatorConfig::default().to_toml_string().unwrap();
        assert!(text.contains("rule_in"));
        assert_eq!(
            CalculatorConfig::from_toml_str(&text).unwrap(),
            CalculatorConfig::default()
        );
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = CalculatorConfig::from_toml_str("[thresholds]\nrule_in = 0.01\nrule_out = 0.2\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThresholds { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nprobability_decimals = 2").unwrap();
        file.flush().unwrap();
        let config = CalculatorConfig::load(file.path()).unwrap();
        assert_eq!(config.display.probability_decimals, 2);
        assert_eq!(config.display.ratio_decimals, 2);
    }

    #[test]
    fn load_reports_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "thresholds = [").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            CalculatorConfig::load(file.path()),
            Err(ConfigError::TomlParseError(_))
        ));
    }
}
