//! Built-in service functions for streamcall.
//!
//! Services are what the model reaches through function calls. The embedding
//! application normally registers its own; this crate ships the `test`
//! service so a fresh install can demonstrate the full loop.

pub mod test_service;

use streamcall_core::command::CommandDescriptor;
use streamcall_core::service::ServiceRegistry;

pub use test_service::{EchoTest, GetDateTime};

/// Name the demonstration functions are registered under.
pub const TEST_SERVICE: &str = "test";

/// Register the `test` service's functions into an existing registry.
pub fn register_test_service(registry: &mut ServiceRegistry) {
    registry.register(TEST_SERVICE, Box::new(EchoTest));
    registry.register(TEST_SERVICE, Box::new(GetDateTime));
}

/// Create a registry holding all built-in services.
pub fn default_registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    register_test_service(&mut registry);
    registry
}

/// The command list advertised to the model for the built-in services.
pub fn command_descriptors() -> Vec<CommandDescriptor> {
    default_registry().descriptors()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_name_both_test_functions() {
        let names: Vec<String> = command_descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["test-echotest", "test-getdatetime"]);
    }

    #[test]
    fn echotest_descriptor_requires_message() {
        let descriptors = command_descriptors();
        let echo = descriptors
            .iter()
            .find(|d| d.name == "test-echotest")
            .unwrap();
        assert_eq!(echo.parameters["required"][0], "echomessage");
        assert_eq!(
            echo.parameters["properties"]["echomessage"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn default_registry_dispatches_echo() {
        let registry = default_registry();
        let out = registry
            .execute("test-echotest", r#"{"echomessage":"hello"}"#)
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn getdatetime_accepts_blank_payload() {
        let registry = default_registry();
        assert!(registry.execute("test-getdatetime", "").await.is_ok());
    }
}
