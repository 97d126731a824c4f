//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::errors::{Result, TranslationError};

/// Default chat-completions endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://api.opentyphoon.ai/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "typhoon-v2.1-12b-instruct";

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
    /// Directory holding the key-value store; platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout_ms: 30000,
            data_dir: None,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_endpoint = lookup("TYPHOON_API_ENDPOINT").unwrap_or(defaults.api_endpoint);
        let model = lookup("TYPHOON_MODEL").unwrap_or(defaults.model);
        let max_tokens = parse_var(&lookup, "TYPHOON_MAX_TOKENS", defaults.max_tokens)?;
        let temperature = parse_var(&lookup, "TYPHOON_TEMPERATURE", defaults.temperature)?;
        let timeout_ms = parse_var(&lookup, "TYPHOON_TIMEOUT_MS", defaults.timeout_ms)?;
        let data_dir = lookup("TYPHOON_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_endpoint,
            model,
            max_tokens,
            temperature,
            timeout_ms,
            data_dir,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_endpoint.trim().is_empty() {
            return Err(config_error("API endpoint is required"));
        }

        if self.model.trim().is_empty() {
            return Err(config_error("model is required"));
        }

        if self.max_tokens == 0 {
            return Err(config_error("max_tokens must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(config_error("temperature must be between 0.0 and 2.0"));
        }

        if self.timeout_ms == 0 {
            return Err(config_error("timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| TranslationError::ConfigError {
            message: format!("{} has an invalid value: {:?}", key, raw),
        }),
        None => Ok(default),
    }
}

fn config_error(message: &str) -> TranslationError {
    TranslationError::ConfigError {
        message: message.to_string(),
    }
}
