//! Configuration loading, validation, and management for streamcall.
//!
//! Loads configuration from `~/.streamcall/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streamcall_core::DEFAULT_MAX_DEPTH;

pub use streamcall_core::DEFAULT_SYSTEM_MESSAGE;

/// The root configuration structure.
///
/// Maps directly to `~/.streamcall/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bearer token for the completion backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Full URL of the chat-completions endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per backend response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Opening system message of every conversation
    #[serde(default = "default_system_message")]
    pub system_message: String,

    /// Maximum chained backend requests per submission
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Log agent internals at debug level
    #[serde(default)]
    pub debug: bool,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_system_message() -> String {
    DEFAULT_SYSTEM_MESSAGE.into()
}
fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_message", &self.system_message)
            .field("max_depth", &self.max_depth)
            .field("debug", &self.debug)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.streamcall/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `STREAMCALL_API_KEY`, then `OPENAI_API_KEY` (only if the file has no key)
    /// - `STREAMCALL_API_URL`
    /// - `STREAMCALL_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::config_path(), |key| std::env::var(key).ok())
    }

    /// Read `path`, apply overrides from `lookup`, then validate the result.
    fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse a specific file path without environment overrides.
    ///
    /// The result is not validated; [`AppConfig::load`] validates after
    /// overrides are applied.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("STREAMCALL_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(url) = lookup("STREAMCALL_API_URL") {
            self.api_url = url;
        }
        if let Some(model) = lookup("STREAMCALL_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".streamcall")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_depth must be at least 1".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be at least 1".into(),
            ));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_message: default_system_message(),
            max_depth: default_max_depth(),
            debug: false,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
