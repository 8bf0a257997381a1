//! Error types for the streamcall domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each boundary (backend, dispatch, service function) has its own enum;
//! [`Error`] is what a resolution chain returns.

use thiserror::Error;

/// The top-level error type for a resolution chain.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion backend ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The streamed function-call arguments were not valid JSON.
    #[error("Malformed arguments for function {function}: {reason}")]
    MalformedArguments { function: String, reason: String },

    /// The chain asked for more backend turns than the agent allows.
    #[error("Recursion depth exceeded: more than {max_depth} chained requests, aborting")]
    DepthExceeded { max_depth: u32 },

    /// A top-level request is already in flight on this agent.
    #[error("Agent is busy with another request")]
    Busy,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Malformed stream event: {0}")]
    MalformedStream(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures raised while resolving or running a command.
///
/// The agent turns every one of these into function-role conversation
/// content instead of aborting the chain.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Malformed command name '{0}': expected <service>-<function>")]
    MalformedCommand(String),

    #[error("Unresolvable command '{command}': unknown service '{service}'")]
    UnknownService { command: String, service: String },

    #[error("Unresolvable command '{command}': service '{service}' has no function '{function}'")]
    UnknownFunction {
        command: String,
        service: String,
        function: String,
    },

    #[error("Malformed arguments for '{command}': {reason}")]
    MalformedArguments { command: String, reason: String },

    #[error("Command '{command}' failed: {source}")]
    ExecutionFailed {
        command: String,
        #[source]
        source: ServiceError,
    },
}

/// Business-logic failure reported by a service function.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn execution_failure_names_the_command() {
        let err = DispatchError::ExecutionFailed {
            command: "svc-run".into(),
            source: ServiceError::Failed("disk full".into()),
        };
        let text = err.to_string();
        assert!(text.contains("svc-run"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn depth_error_mentions_limit() {
        let err = Error::DepthExceeded { max_depth: 10 };
        assert!(err.to_string().contains("10"));
    }
}
