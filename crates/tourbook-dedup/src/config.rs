//! Duplicate scorer configuration

use serde::{Deserialize, Serialize};

/// Weights and thresholds for duplicate scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Weight of an exact date match
    pub date_weight: f64,

    /// Weight of a title match
    pub title_weight: f64,

    /// Weight of a venue name match
    pub venue_weight: f64,

    /// Weight of a city match
    pub city_weight: f64,

    /// Subtracted when both dates are known and differ
    pub date_mismatch_penalty: f64,

    /// Minimum score for a record to be reported (0.0-1.0)
    pub acceptance_threshold: f64,

    /// Allow near-identical titles and venue names to match
    pub fuzzy_titles: bool,

    /// Jaro-Winkler similarity needed for a fuzzy match (0.0-1.0)
    pub fuzzy_title_floor: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            date_weight: 0.45,
            title_weight: 0.30,
            venue_weight: 0.15,
            city_weight: 0.10,
            date_mismatch_penalty: 0.25,
            acceptance_threshold: 0.5,
            fuzzy_titles: true,
            fuzzy_title_floor: 0.9,
        }
    }
}

impl ScorerConfig {
    /// Exact matching only, higher bar
    pub fn strict() -> Self {
        Self {
            acceptance_threshold: 0.7,
            fuzzy_titles: false,
            ..Self::default()
        }
    }

    /// Flag more possible duplicates
    pub fn lenient() -> Self {
        Self {
            acceptance_threshold: 0.4,
            fuzzy_title_floor: 0.85,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("date_weight", self.date_weight),
            ("title_weight", self.title_weight),
            ("venue_weight", self.venue_weight),
            ("city_weight", self.city_weight),
        ];
        for (name, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(format!("weights must sum to 1.0 (got {:.3})", total));
        }

        if !(0.0..=1.0).contains(&self.date_mismatch_penalty) {
            return Err("date_mismatch_penalty must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err("acceptance_threshold must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.fuzzy_title_floor) {
            return Err("fuzzy_title_floor must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}
