//! Configuration for the FormatExtractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for text extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Documents with fewer words are flagged as low-text
    pub min_words: usize,

    /// Paged documents below this words-per-page density are flagged as low-text
    pub min_words_per_page: usize,

    /// Maximum time for OCR on one image (seconds)
    pub ocr_timeout_secs: u64,

    /// Inputs larger than this are rejected without parsing
    pub max_input_bytes: usize,

    /// Path or name of the tesseract binary
    pub tesseract_path: String,

    /// Tesseract language codes, joined with `+` on the command line
    pub ocr_languages: Vec<String>,
}

impl IngestConfig {
    /// Get the OCR timeout as a Duration
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_words == 0 {
            return Err("min_words must be greater than 0".to_string());
        }
        if self.min_words_per_page == 0 {
            return Err("min_words_per_page must be greater than 0".to_string());
        }
        if self.ocr_timeout_secs == 0 {
            return Err("ocr_timeout_secs must be greater than 0".to_string());
        }
        if self.max_input_bytes == 0 {
            return Err("max_input_bytes must be greater than 0".to_string());
        }
        if self.tesseract_path.trim().is_empty() {
            return Err("tesseract_path must not be empty".to_string());
        }
        if self.ocr_languages.is_empty() {
            return Err("ocr_languages must name at least one language".to_string());
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_words: 200,
            min_words_per_page: 30,
            ocr_timeout_secs: 60,
            max_input_bytes: 25 * 1024 * 1024,
            tesseract_path: "tesseract".to_string(),
            ocr_languages: vec!["eng".to_string()],
        }
    }
}

impl IngestConfig {
    /// Strict preset: flag more documents as low-text, give OCR less time
    pub fn strict() -> Self {
        Self {
            min_words: 300,
            min_words_per_page: 60,
            ocr_timeout_secs: 30,
            max_input_bytes: 10 * 1024 * 1024,
            ..Self::default()
        }
    }

    /// Lenient preset: accept sparse documents and large uploads
    pub fn lenient() -> Self {
        Self {
            min_words: 50,
            min_words_per_page: 10,
            ocr_timeout_secs: 180,
            max_input_bytes: 100 * 1024 * 1024,
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
