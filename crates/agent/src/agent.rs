//! The function-calling agent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use streamcall_core::agent::{AgentState, DEFAULT_MAX_DEPTH, DEFAULT_SYSTEM_MESSAGE};
use streamcall_core::command::CommandDescriptor;
use streamcall_core::error::{Error, Result};
use streamcall_core::message::{Conversation, FunctionCall, Message};
use streamcall_core::provider::{Provider, ProviderRequest, StreamFragment};
use streamcall_core::service::{ServiceRegistry, parse_arguments};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::stream_event::AgentStreamEvent;

/// A conversational agent that streams replies and resolves function calls.
///
/// One agent owns one conversation. Submissions are serialized: while one is
/// in flight, another is rejected with [`Error::Busy`].
pub struct Agent {
    /// The completion backend
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per backend response
    max_tokens: Option<u32>,

    /// Functions reachable by command name
    services: Arc<ServiceRegistry>,

    /// Command list advertised to the model
    commands: Vec<CommandDescriptor>,

    /// Maximum backend requests per submission
    max_depth: u32,

    /// Receives text chunks and lifecycle events
    output: Option<mpsc::UnboundedSender<AgentStreamEvent>>,

    busy: AtomicBool,
    depth: AtomicU32,
    requests_processed: AtomicU64,
    conversation: Mutex<Conversation>,
}

/// Text, function name and argument buffers for one streamed reply.
#[derive(Debug, Default)]
struct Turn {
    text: String,
    function_name: Option<String>,
    arguments: String,
}

/// Holds the busy flag for one submission.
///
/// Dropping it (normal return, `?`, panic or a cancelled future) restores the
/// depth counter and frees the agent.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    depth: &'a AtomicU32,
    entry_depth: u32,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a AtomicBool, depth: &'a AtomicU32) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            busy,
            depth,
            entry_depth: depth.load(Ordering::Acquire),
        })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.depth.store(self.entry_depth, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }
}

impl Agent {
    /// Create an agent over `provider` that can call every function in
    /// `services`.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        services: Arc<ServiceRegistry>,
    ) -> Self {
        let commands = services.descriptors();
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            services,
            commands,
            max_depth: DEFAULT_MAX_DEPTH,
            output: None,
            busy: AtomicBool::new(false),
            depth: AtomicU32::new(0),
            requests_processed: AtomicU64::new(0),
            conversation: Mutex::new(Conversation::with_system(DEFAULT_SYSTEM_MESSAGE)),
        }
    }

    /// Set the max tokens per backend response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of backend requests per submission.
    pub fn with_max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Replace the opening system message.
    pub fn with_system_message(mut self, prompt: impl Into<String>) -> Self {
        self.conversation = Mutex::new(Conversation::with_system(prompt));
        self
    }

    /// Advertise an explicit command list instead of the registry's own.
    pub fn with_commands(mut self, commands: Vec<CommandDescriptor>) -> Self {
        self.commands = commands;
        self
    }

    /// Send streaming events to `tx`.
    pub fn with_output(mut self, tx: mpsc::UnboundedSender<AgentStreamEvent>) -> Self {
        self.output = Some(tx);
        self
    }

    /// Whether a new submission would be accepted right now.
    pub fn is_available(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// Backend requests made by the in-flight submission (0 when idle).
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Acquire)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Snapshot of the conversation.
    pub async fn history(&self) -> Vec<Message> {
        self.conversation.lock().await.messages.clone()
    }

    /// Snapshot of the runtime state.
    pub async fn state(&self) -> AgentState {
        AgentState {
            is_busy: !self.is_available(),
            depth: self.depth(),
            requests_processed: self.requests_processed.load(Ordering::Acquire),
            context_len: self.conversation.lock().await.messages.len(),
        }
    }

    /// Submit user text and return the reply as display text.
    ///
    /// Failures come back as `"error: <description>"`.
    pub async fn submit(&self, text: impl Into<String>) -> String {
        match self.process(text).await {
            Ok(reply) => reply,
            Err(e) => format!("error: {e}"),
        }
    }

    /// Submit user text and resolve every function call the model makes.
    pub async fn process(&self, text: impl Into<String>) -> Result<String> {
        let Some(_guard) = BusyGuard::acquire(&self.busy, &self.depth) else {
            warn!("Submission rejected, agent is busy");
            return Err(Error::Busy);
        };

        let text = text.into();
        {
            let mut conversation = self.conversation.lock().await;
            conversation.push(Message::user(text));
            info!(
                model = %self.model,
                messages = conversation.messages.len(),
                "Processing submission"
            );
        }

        let result = self.resolve().await;
        self.requests_processed.fetch_add(1, Ordering::AcqRel);

        if let Err(e) = &result {
            warn!(error = %e, "Submission failed");
            self.emit(AgentStreamEvent::Error {
                message: e.to_string(),
            });
        }
        result
    }

    /// Run backend turns until one finishes without a function call.
    async fn resolve(&self) -> Result<String> {
        let mut function_calls = 0;

        loop {
            let depth = self.enter_request()?;
            debug!(depth, max_depth = self.max_depth, "Agent loop iteration");

            let turn = self.stream_turn().await?;

            let Some(name) = turn.function_name else {
                self.conversation
                    .lock()
                    .await
                    .push(Message::assistant(turn.text.clone()));
                self.emit(AgentStreamEvent::Done {
                    requests: depth,
                    function_calls,
                });
                return Ok(turn.text);
            };

            let arguments =
                parse_arguments(&turn.arguments).map_err(|e| Error::MalformedArguments {
                    function: name.clone(),
                    reason: e.to_string(),
                })?;

            self.conversation.lock().await.push(Message::function_call(
                FunctionCall {
                    name: name.clone(),
                    arguments: turn.arguments,
                },
                Some(turn.text),
            ));
            self.emit(AgentStreamEvent::FunctionCall {
                name: name.clone(),
                arguments: arguments.clone(),
            });

            function_calls += 1;
            let (output, success) = match self.services.invoke(&name, arguments).await {
                Ok(output) => (output, true),
                Err(e) => {
                    warn!(function = %name, error = %e, "Function call failed");
                    (format!("Function {name} failed. Error: {e}"), false)
                }
            };
            debug!(function = %name, success, "Function result");

            self.conversation
                .lock()
                .await
                .push(Message::function_result(&name, &output));
            self.emit(AgentStreamEvent::FunctionResult {
                name,
                output,
                success,
            });
        }
    }

    /// Count one more backend request, refusing past `max_depth`.
    fn enter_request(&self) -> Result<u32> {
        let current = self.depth.load(Ordering::Acquire);
        if current >= self.max_depth {
            warn!(max_depth = self.max_depth, "Recursion depth exceeded, aborting");
            return Err(Error::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        let next = current + 1;
        self.depth.store(next, Ordering::Release);
        Ok(next)
    }

    /// Issue one streaming request and fold its fragments into a [`Turn`].
    async fn stream_turn(&self) -> Result<Turn> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: self.conversation.lock().await.messages.clone(),
            functions: self.commands.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let mut rx = self.provider.stream(request).await?;
        let mut turn = Turn::default();

        while let Some(fragment) = rx.recv().await {
            match fragment? {
                StreamFragment::Text(content) => {
                    turn.text.push_str(&content);
                    self.emit(AgentStreamEvent::Chunk { content });
                }
                StreamFragment::FunctionName(name) => {
                    if let Some(previous) = turn.function_name.replace(name) {
                        warn!(
                            previous = %previous,
                            "Model named a second function in one reply, keeping the last"
                        );
                    }
                }
                StreamFragment::FunctionArguments(part) => turn.arguments.push_str(&part),
            }
        }

        Ok(turn)
    }

    fn emit(&self, event: AgentStreamEvent) {
        if let Some(tx) = &self.output {
            // A closed receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}
