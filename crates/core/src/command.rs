//! Command names and descriptors.
//!
//! Every callable capability is addressed as `<service>-<function>`. The
//! descriptor list is sent to the backend so the model knows what it may call;
//! its parameter schemas are never validated locally.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DispatchError;

/// Separates the service name from the function name.
pub const COMMAND_SEPARATOR: char = '-';

/// Static metadata describing one callable command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// `<service>-<function>`
    pub name: String,

    /// Description of what the command does (sent to the LLM)
    pub description: String,

    /// JSON Schema describing the command's parameters
    pub parameters: serde_json::Value,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A command name split into its service and function parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandName {
    pub service: String,
    pub function: String,
}

impl CommandName {
    /// Split `raw` on the first separator.
    ///
    /// Both halves must be non-empty; the function half may itself contain
    /// the separator (`a-b-c` is service `a`, function `b-c`).
    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        match raw.split_once(COMMAND_SEPARATOR) {
            Some((service, function)) if !service.is_empty() && !function.is_empty() => Ok(Self {
                service: service.to_string(),
                function: function.to_string(),
            }),
            _ => Err(DispatchError::MalformedCommand(raw.to_string())),
        }
    }

    pub fn new(service: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.service, COMMAND_SEPARATOR, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_and_function() {
        let name = CommandName::parse("svcA-doThing").unwrap();
        assert_eq!(name.service, "svcA");
        assert_eq!(name.function, "doThing");
        assert_eq!(name.to_string(), "svcA-doThing");
    }

    #[test]
    fn splits_on_first_separator_only() {
        let name = CommandName::parse("files-read-all").unwrap();
        assert_eq!(name.service, "files");
        assert_eq!(name.function, "read-all");
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = CommandName::parse("nodashname").unwrap_err();
        assert!(matches!(err, DispatchError::MalformedCommand(ref n) if n == "nodashname"));
    }

    #[test]
    fn empty_halves_are_malformed() {
        for raw in ["-doThing", "svcA-", "-", ""] {
            assert!(
                matches!(CommandName::parse(raw), Err(DispatchError::MalformedCommand(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn descriptor_serialization() {
        let desc = CommandDescriptor::new(
            "test-echotest",
            "Echo a message",
            serde_json::json!({
                "type": "object",
                "properties": { "echomessage": { "type": "string" } },
                "required": ["echomessage"]
            }),
        );
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["name"], "test-echotest");
        assert_eq!(json["parameters"]["required"][0], "echomessage");
    }
}
