//! Import pipeline configuration

use serde::{Deserialize, Serialize};
use tourbook_dedup::ScorerConfig;
use tourbook_domain::ExtractionMode;
use tourbook_extractor::ExtractorConfig;
use tourbook_ingest::IngestConfig;

/// Configuration for the whole import pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Minimum job confidence for a duplicate-free job to complete
    /// without review (0.0-1.0); a job exactly at the threshold completes
    pub min_review_confidence: f64,

    /// How candidates are derived: `llm` or `rule_based`
    pub mode: ExtractionMode,

    /// Text extraction settings
    pub ingest: IngestConfig,

    /// Structured extraction settings
    pub extractor: ExtractorConfig,

    /// Duplicate scoring settings
    pub scorer: ScorerConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_review_confidence: 0.6,
            mode: ExtractionMode::Llm,
            ingest: IngestConfig::default(),
            extractor: ExtractorConfig::default(),
            scorer: ScorerConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Regex extraction only, no backend calls
    pub fn rule_based() -> Self {
        Self {
            mode: ExtractionMode::RuleBased,
            ..Self::default()
        }
    }

    /// Validate this configuration and every nested one
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_review_confidence) {
            return Err("min_review_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.mode == ExtractionMode::LlmImproved {
            return Err("mode must be llm or rule_based".to_string());
        }
        self.ingest.validate().map_err(|e| format!("ingest: {}", e))?;
        self.extractor
            .validate()
            .map_err(|e| format!("extractor: {}", e))?;
        self.scorer.validate().map_err(|e| format!("scorer: {}", e))?;
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
