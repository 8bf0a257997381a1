//! OpenAI-compatible provider implementation.
//!
//! Speaks the streaming `chat/completions` protocol with the `functions`
//! function-calling extension. Works with OpenAI and any endpoint that
//! mirrors it (Azure OpenAI deployments, vLLM, llama.cpp server, Ollama).

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use streamcall_core::command::CommandDescriptor;
use streamcall_core::error::ProviderError;
use streamcall_core::message::Message;
use streamcall_core::provider::{FragmentReceiver, ProviderRequest, StreamFragment};
use tracing::{debug, trace, warn};

use crate::sse::{SseDecoder, SseEvent};

/// Default endpoint for OpenAI itself.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// An OpenAI-compatible streaming LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider posting to the full `chat/completions` URL.
    pub fn new(
        name: impl Into<String>,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            name: name.into(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Convert our Message types to the wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
                name: m.name.clone(),
                function_call: m.function_call.as_ref().map(|fc| ApiFunctionCall {
                    name: fc.name.clone(),
                    arguments: fc.arguments.clone(),
                }),
            })
            .collect()
    }

    /// Convert command descriptors to the wire format.
    fn to_api_functions(commands: &[CommandDescriptor]) -> Vec<ApiFunctionDefinition> {
        commands
            .iter()
            .map(|c| ApiFunctionDefinition {
                name: c.name.clone(),
                description: c.description.clone(),
                parameters: c.parameters.clone(),
            })
            .collect()
    }

    /// Build the JSON request body.
    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": true,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        // An empty `functions` array is rejected by the API
        if !request.functions.is_empty() {
            body["functions"] = serde_json::json!(Self::to_api_functions(&request.functions));
        }

        body
    }
}

#[async_trait]
impl streamcall_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream(&self, request: ProviderRequest) -> Result<FragmentReceiver, ProviderError> {
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            functions = request.functions.len(),
            "Sending streaming request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider streaming error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider_name = self.name.clone();

        // Read the SSE byte stream on its own task; dropping `rx` stops it
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for data in decoder.feed(&bytes) {
                    if !forward(&tx, &provider_name, &data).await {
                        return;
                    }
                }
            }

            // The last line may lack its newline
            if let Some(data) = decoder.finish() {
                debug!(provider = %provider_name, "Stream ended mid-line");
                if !forward(&tx, &provider_name, &data).await {
                    return;
                }
            }

            warn!(provider = %provider_name, "Stream closed without [DONE]");
            let _ = tx
                .send(Err(ProviderError::StreamInterrupted(
                    "stream ended before [DONE]".into(),
                )))
                .await;
        });

        Ok(rx)
    }
}

/// Parse one payload and send its fragments.
///
/// Returns `false` once reading should stop: `[DONE]`, an error, or a
/// dropped receiver.
async fn forward(tx: &FragmentSender, provider: &str, data: &str) -> bool {
    trace!(provider, data, "SSE data line");

    match parse_event(data) {
        Ok(SseEvent::Done) => false,
        Ok(SseEvent::Fragments(fragments)) => {
            for fragment in fragments {
                if tx.send(Ok(fragment)).await.is_err() {
                    return false; // receiver dropped
                }
            }
            true
        }
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            false
        }
    }
}

type FragmentSender = tokio::sync::mpsc::Sender<Result<StreamFragment, ProviderError>>;

/// Turn one SSE `data:` payload into fragments.
///
/// Content and function-call deltas become separate fragments in the order
/// text, name, arguments. Empty deltas are dropped.
pub(crate) fn parse_event(data: &str) -> Result<SseEvent, ProviderError> {
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: StreamResponse = serde_json::from_str(data)
        .map_err(|e| ProviderError::MalformedStream(format!("{e}: {data}")))?;

    if let Some(error) = chunk.error {
        return Err(ProviderError::ApiError {
            status_code: 200,
            message: error.message,
        });
    }

    let mut fragments = Vec::new();
    if let Some(choice) = chunk.choices.into_iter().next() {
        let delta = choice.delta;

        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            fragments.push(StreamFragment::Text(content));
        }

        if let Some(call) = delta.function_call {
            if let Some(name) = call.name.filter(|n| !n.is_empty()) {
                fragments.push(StreamFragment::FunctionName(name));
            }
            if let Some(args) = call.arguments.filter(|a| !a.is_empty()) {
                fragments.push(StreamFragment::FunctionArguments(args));
            }
        }
    }

    Ok(SseEvent::Fragments(fragments))
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionDefinition {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<StreamFunctionDelta>,
}

/// A function call delta — the name arrives once, arguments in pieces.
#[derive(Debug, Deserialize)]
struct StreamFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: String,
}
