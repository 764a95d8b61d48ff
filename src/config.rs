//! Configuration loading and management for recap.
//!
//! Loads settings from `recap.toml` with environment variable overrides for sensitive data.
//! When no config file exists the built-in defaults are used.

use crate::agent::{default_candidates, Credential, KeyStore, ServiceConfig, DEFAULT_BASE_URL};
use crate::summary::DetailLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "recap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing credential: set GEMINI_API_KEY or GEMINI_OAUTH_TOKEN, or add [api] key to recap.toml")]
    MissingCredential,
}

/// Gemini API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key, sent as a query parameter
    #[serde(default)]
    pub key: Option<String>,
    /// OAuth access token obtained by an external sign-in flow
    #[serde(default)]
    pub oauth_token: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: None,
            oauth_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Detail level used when none is given on the command line
    #[serde(default)]
    pub detail: DetailLevel,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Candidate models, tried in order
    #[serde(default = "default_candidates")]
    pub models: Vec<ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            summary: SummaryConfig::default(),
            models: default_candidates(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (recap.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::read(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api.key = Some(key);
        }
        if let Ok(token) = std::env::var("GEMINI_OAUTH_TOKEN") {
            self.api.oauth_token = Some(token);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("recap")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// Resolve the credential for a request, preferring the API key
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        Credential::resolve(self.api.key.as_deref(), self.api.oauth_token.as_deref())
            .map_err(|_| ConfigError::MissingCredential)
    }
}

impl KeyStore for Config {
    fn api_key(&self) -> Option<String> {
        self.api.key.api_key()
    }
}
