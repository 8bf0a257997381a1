//! Service dispatch — the capability map behind function calls.
//!
//! The embedding application registers [`ServiceFunction`]s under a service
//! name. The agent resolves a model-requested command `<service>-<function>`
//! through the [`ServiceRegistry`] and invokes it at most once.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::command::{CommandDescriptor, CommandName};
use crate::error::{DispatchError, ServiceError};

/// One callable function of a service.
///
/// Implementations receive the parsed argument record and return text that
/// is fed back to the model.
#[async_trait]
pub trait ServiceFunction: Send + Sync {
    /// The function's name within its service (e.g., "echotest").
    fn name(&self) -> &str;

    /// A description of what this function does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this function's parameters.
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    /// Execute the function with the given arguments.
    async fn call(&self, arguments: serde_json::Value) -> Result<String, ServiceError>;

    /// Describe this function as the command `<service>-<name>`.
    fn to_descriptor(&self, service: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: CommandName::new(service, self.name()).to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of services and their functions.
pub struct ServiceRegistry {
    services: HashMap<String, HashMap<String, Box<dyn ServiceFunction>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Register a function under `service`. Replaces any existing function
    /// with the same name in that service.
    pub fn register(&mut self, service: impl Into<String>, function: Box<dyn ServiceFunction>) {
        let name = function.name().to_string();
        self.services
            .entry(service.into())
            .or_default()
            .insert(name, function);
    }

    /// Look up the function addressed by a command name.
    pub fn get(&self, command: &str) -> Result<&dyn ServiceFunction, DispatchError> {
        let name = CommandName::parse(command)?;
        let functions =
            self.services
                .get(&name.service)
                .ok_or_else(|| DispatchError::UnknownService {
                    command: command.to_string(),
                    service: name.service.clone(),
                })?;
        functions
            .get(&name.function)
            .map(|f| f.as_ref())
            .ok_or_else(|| DispatchError::UnknownFunction {
                command: command.to_string(),
                service: name.service,
                function: name.function,
            })
    }

    /// Descriptors for every registered function, sorted by command name.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        let sorted: BTreeMap<String, CommandDescriptor> = self
            .services
            .iter()
            .flat_map(|(service, functions)| {
                functions.values().map(move |f| {
                    let desc = f.to_descriptor(service);
                    (desc.name.clone(), desc)
                })
            })
            .collect();
        sorted.into_values().collect()
    }

    /// List all registered service names.
    pub fn services(&self) -> Vec<&str> {
        self.services.keys().map(|s| s.as_str()).collect()
    }

    /// List the function names of one service.
    pub fn function_names(&self, service: &str) -> Vec<&str> {
        self.services
            .get(service)
            .map(|fns| fns.keys().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Resolve `command`, parse `payload` as JSON, and run the function.
    pub async fn execute(&self, command: &str, payload: &str) -> Result<String, DispatchError> {
        let function = self.get(command)?;
        let arguments = parse_arguments(payload).map_err(|e| DispatchError::MalformedArguments {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        run(command, function, arguments).await
    }

    /// Resolve `command` and run it with already-parsed arguments.
    pub async fn invoke(
        &self,
        command: &str,
        arguments: serde_json::Value,
    ) -> Result<String, DispatchError> {
        let function = self.get(command)?;
        run(command, function, arguments).await
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

async fn run(
    command: &str,
    function: &dyn ServiceFunction,
    arguments: serde_json::Value,
) -> Result<String, DispatchError> {
    debug!(command, arguments = %arguments, "Executing service command");
    function
        .call(arguments)
        .await
        .map_err(|source| DispatchError::ExecutionFailed {
            command: command.to_string(),
            source,
        })
}

/// Parse a serialized argument record. Blank input means "no arguments".
pub fn parse_arguments(payload: &str) -> Result<serde_json::Value, serde_json::Error> {
    if payload.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test function for unit tests.
    struct EchoFunction;

    #[async_trait]
    impl ServiceFunction for EchoFunction {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn call(&self, arguments: serde_json::Value) -> Result<String, ServiceError> {
            arguments["text"]
                .as_str()
                .map(String::from)
                .ok_or_else(|| ServiceError::InvalidArguments("missing 'text'".into()))
        }
    }

    fn registry() -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.register("util", Box::new(EchoFunction));
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("util-echo").is_ok());
        assert_eq!(registry.services(), vec!["util"]);
        assert_eq!(registry.function_names("util"), vec!["echo"]);
        assert!(registry.function_names("nope").is_empty());
    }

    #[test]
    fn registry_descriptors_use_compound_names() {
        let defs = registry().descriptors();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "util-echo");
        assert_eq!(defs[0].parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn execute_parses_payload() {
        let out = registry()
            .execute("util-echo", r#"{"text":"hello world"}"#)
            .await
            .unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn unknown_service_and_function_are_unresolvable() {
        let registry = registry();
        let err = registry.invoke("nope-echo", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownService { ref service, .. } if service == "nope"));

        let err = registry.invoke("util-shout", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownFunction { ref function, .. } if function == "shout"));
    }

    #[tokio::test]
    async fn malformed_command_is_rejected() {
        let err = registry().execute("nodashname", "{}").await.unwrap_err();
        assert!(matches!(err, DispatchError::MalformedCommand(_)));
    }

    #[tokio::test]
    async fn malformed_payload_is_distinct() {
        let err = registry().execute("util-echo", "{not json").await.unwrap_err();
        assert!(matches!(err, DispatchError::MalformedArguments { .. }));
    }

    #[tokio::test]
    async fn function_failure_is_wrapped() {
        let err = registry().execute("util-echo", "{}").await.unwrap_err();
        match err {
            DispatchError::ExecutionFailed { command, source } => {
                assert_eq!(command, "util-echo");
                assert!(matches!(source, ServiceError::InvalidArguments(_)));
            }
            other => panic!("Expected ExecutionFailed, got {other:?}"),
        }
    }

    #[test]
    fn blank_payload_is_empty_object() {
        assert_eq!(parse_arguments("  ").unwrap(), serde_json::json!({}));
        assert!(parse_arguments("{").is_err());
    }
}
