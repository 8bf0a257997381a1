//! Agent-level streaming events.
//!
//! `AgentStreamEvent` is what the agent pushes to its output channel while a
//! submission is being resolved, so callers can render text as it arrives.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent during streaming execution.
///
/// - `chunk`           — partial text from the model, in stream order
/// - `function_call`   — the model asked for a service function
/// - `function_result` — the function's output (or failure text)
/// - `done`            — the submission resolved to a final reply
/// - `error`           — the submission failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Partial text from the model.
    Chunk { content: String },

    /// The agent is calling a service function.
    FunctionCall {
        name: String,
        arguments: serde_json::Value,
    },

    /// Service function completed (or failed and was reported to the model).
    FunctionResult {
        name: String,
        output: String,
        success: bool,
    },

    /// The submission is complete.
    Done {
        /// Backend requests the chain needed
        requests: u32,
        function_calls: usize,
    },

    /// The submission failed.
    Error { message: String },
}

impl AgentStreamEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::FunctionCall { .. } => "function_call",
            Self::FunctionResult { .. } => "function_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_chunk() {
        let event = AgentStreamEvent::Chunk {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn event_serialization_function_call() {
        let event = AgentStreamEvent::FunctionCall {
            name: "test-echotest".into(),
            arguments: serde_json::json!({"echomessage": "hi"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"function_call""#));
        assert!(json.contains(r#""name":"test-echotest""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = AgentStreamEvent::Done {
            requests: 2,
            function_calls: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains(r#""requests":2"#));
    }

    #[test]
    fn event_type_names() {
        let events = [
            (AgentStreamEvent::Chunk { content: "x".into() }, "chunk"),
            (
                AgentStreamEvent::FunctionCall {
                    name: "a-b".into(),
                    arguments: serde_json::Value::Null,
                },
                "function_call",
            ),
            (
                AgentStreamEvent::FunctionResult {
                    name: "a-b".into(),
                    output: "c".into(),
                    success: true,
                },
                "function_result",
            ),
            (
                AgentStreamEvent::Done {
                    requests: 1,
                    function_calls: 0,
                },
                "done",
            ),
            (AgentStreamEvent::Error { message: "x".into() }, "error"),
        ];
        for (event, name) in events {
            assert_eq!(event.event_type(), name);
        }
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"function_result","name":"a-b","output":"ok","success":false}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            AgentStreamEvent::FunctionResult {
                name: "a-b".into(),
                output: "ok".into(),
                success: false,
            }
        );
    }
}
