//! Completion backend implementations for streamcall.
//!
//! All providers implement the `streamcall_core::Provider` trait.
//! [`build_from_config`] constructs the configured backend.

pub mod openai_compat;
pub mod sse;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use streamcall_config::AppConfig;
use streamcall_core::error::ProviderError;
use streamcall_core::provider::Provider;

/// Build the provider described by the configuration.
///
/// The endpoint is always OpenAI-compatible; a missing API key is an error
/// so the agent never starts with a backend it cannot authenticate to.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no API key: set api_key in config.toml or STREAMCALL_API_KEY".into(),
            )
        })?;

    let name = if config.api_url == openai_compat::OPENAI_CHAT_URL {
        "openai"
    } else {
        "custom"
    };

    tracing::debug!(provider = name, url = %config.api_url, "Building provider");
    Ok(Arc::new(OpenAiCompatProvider::new(
        name,
        &config.api_url,
        api_key,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = build_from_config(&AppConfig::default())
            .err()
            .expect("should fail without a key");
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn default_url_is_openai() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn other_urls_are_custom() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            api_url: "http://localhost:11434/v1/chat/completions".into(),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "custom");
    }
}
