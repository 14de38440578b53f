//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tourbook_import::ImportConfig;
use tourbook_llm::LlmCredentials;

/// Environment variable holding the backend API key
pub const ENV_API_KEY: &str = "TOURBOOK_API_KEY";
/// Environment variable overriding the backend endpoint
pub const ENV_ENDPOINT: &str = "TOURBOOK_LLM_ENDPOINT";
/// Environment variable overriding the backend model
pub const ENV_MODEL: &str = "TOURBOOK_LLM_MODEL";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Backend credentials; the environment overrides these
    #[serde(default)]
    pub llm: LlmCredentials,

    /// Pipeline settings
    #[serde(default)]
    pub import: ImportConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Organization used when a command does not name one
    #[serde(default = "default_org")]
    pub org_id: String,

    /// Job database path; defaults to `~/.tourbook/jobs.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the config file and the default job database.
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".tourbook"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load configuration from the default file, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config
            .import
            .validate()
            .map_err(|e| CliError::Config(format!("import: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to the default file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Job database path.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.settings.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dir()?.join("jobs.db")),
        }
    }

    /// Credentials with process environment overrides applied.
    pub fn credentials(&self) -> LlmCredentials {
        self.credentials_with(|key| std::env::var(key).ok())
    }

    /// Credentials with overrides looked up through `lookup`.
    pub fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> LlmCredentials {
        let mut credentials = self.llm.clone();
        if let Some(api_key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            credentials.api_key = Some(api_key);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            credentials.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            credentials.model = model;
        }
        credentials
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            org_id: default_org(),
            db_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_org() -> String {
    "default".to_string()
}
