//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the whole system:
//! user submits text → Agent appends a message → Provider streams a reply →
//! function results are appended as function-role messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// Result of a locally executed function
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

/// A function invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Command name, `<service>-<function>`
    pub name: String,

    /// Arguments as the raw JSON string the model produced
    pub arguments: String,
}

/// A single message in a conversation.
///
/// Messages are never edited after they are appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content; absent on function-invoking assistant turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// For function-role messages, the function that produced the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// For assistant turns that invoke a function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            name: None,
            function_call: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Create an assistant turn that invokes a function.
    ///
    /// Any text the model streamed before the call is kept as content.
    pub fn function_call(call: FunctionCall, content: Option<String>) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content.filter(|c| !c.is_empty()));
        msg.function_call = Some(call);
        msg
    }

    /// Create a function-role message carrying a function's result.
    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Function, Some(content.into()));
        msg.name = Some(name.into());
        msg
    }

    /// The text content, or an empty string.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// An ordered, append-only sequence of messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// Ordered messages
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation opened by a single system message.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello, agent!");
        assert!(msg.function_call.is_none());
        assert!(msg.name.is_none());
    }

    #[test]
    fn function_result_carries_name() {
        let msg = Message::function_result("test-echotest", "hi");
        assert_eq!(msg.role, Role::Function);
        assert_eq!(msg.name.as_deref(), Some("test-echotest"));
        assert_eq!(msg.text(), "hi");
    }

    #[test]
    fn function_call_turn_drops_empty_content() {
        let call = FunctionCall {
            name: "test-getdatetime".into(),
            arguments: "{}".into(),
        };
        let msg = Message::function_call(call.clone(), Some(String::new()));
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_none());
        assert_eq!(msg.function_call, Some(call));
    }

    #[test]
    fn conversation_opens_with_system_message() {
        let mut conv = Conversation::with_system("Be brief.");
        conv.push(Message::user("First message"));
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::System);
        assert_eq!(conv.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Function).unwrap();
        assert_eq!(json, r#""function""#);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
