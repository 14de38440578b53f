//! Configuration for the StructuredExtractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for structured extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for a single backend call (seconds)
    pub backend_timeout_secs: u64,

    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Upper bound on candidates taken from one document
    pub max_candidates: usize,
}

impl ExtractorConfig {
    /// Get the backend timeout as a Duration
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_timeout_secs == 0 {
            return Err("backend_timeout_secs must be greater than 0".to_string());
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_candidates == 0 {
            return Err("max_candidates must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            backend_timeout_secs: 45,
            max_text_length: 50_000,
            max_candidates: 25,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: short timeout, small inputs
    pub fn aggressive() -> Self {
        Self {
            backend_timeout_secs: 30,
            max_text_length: 20_000,
            max_candidates: 10,
            ..Self::default()
        }
    }

    /// Lenient preset: long timeout, large routing sheets
    pub fn lenient() -> Self {
        Self {
            backend_timeout_secs: 60,
            max_text_length: 100_000,
            max_candidates: 100,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            backend_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stale_model_name_key_is_ignored() {
        let config = ExtractorConfig::from_toml("max_candidates = 5\nmodel_name = \"gpt-4o\"\n").unwrap();
        assert_eq!(config.max_candidates, 5);
        assert!(!config.to_toml().unwrap().contains("model"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
