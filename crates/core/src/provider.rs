//! Provider trait — the abstraction over the completion backend.
//!
//! A Provider takes the conversation and the command list and returns the
//! model's reply as a stream of [`StreamFragment`]s. The stream is finite and
//! cannot be restarted: closing the channel marks the end of the response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::command::CommandDescriptor;
use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// The full conversation history
    pub messages: Vec<Message>,

    /// Commands the model is allowed to call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<CommandDescriptor>,

    /// Temperature (0.0 = deterministic, 2.0 = very creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

fn default_temperature() -> f32 {
    0.7
}

/// One incremental piece of a streamed reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StreamFragment {
    /// A slice of the assistant's text
    Text(String),

    /// The name of the function the model wants to call
    FunctionName(String),

    /// A slice of the serialized function arguments
    FunctionArguments(String),
}

/// The receiving end of a streamed reply.
pub type FragmentReceiver = mpsc::Receiver<std::result::Result<StreamFragment, ProviderError>>;

/// The core Provider trait.
///
/// The agent calls `stream()` without knowing which backend is behind it,
/// which is also how tests script replies.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a stream of response fragments.
    ///
    /// Errors returned here happen before any fragment is produced
    /// (connection refused, non-success status). Errors after that arrive
    /// through the channel.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<FragmentReceiver, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_request_defaults() {
        let json = r#"{"model":"gpt-3.5-turbo","messages":[]}"#;
        let req: ProviderRequest = serde_json::from_str(json).unwrap();
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!req.stream);
        assert!(req.functions.is_empty());
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn fragment_serialization() {
        let json = serde_json::to_string(&StreamFragment::FunctionName("svc-fn".into())).unwrap();
        assert_eq!(json, r#"{"kind":"function_name","value":"svc-fn"}"#);
    }
}
