//! The `test` service — exercises the function-calling path end to end.
//!
//! `test-echotest` returns its `echomessage` argument unchanged and
//! `test-getdatetime` returns the current UTC time.

use async_trait::async_trait;
use streamcall_core::error::ServiceError;
use streamcall_core::service::ServiceFunction;
use tracing::debug;

/// Echoes the `echomessage` argument.
pub struct EchoTest;

#[async_trait]
impl ServiceFunction for EchoTest {
    fn name(&self) -> &str {
        "echotest"
    }

    fn description(&self) -> &str {
        "Test the function calling functionality with an echo message."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "echomessage": {
                    "type": "string",
                    "description": "This is the message to be echoed."
                }
            },
            "required": ["echomessage"]
        })
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<String, ServiceError> {
        let message = arguments["echomessage"].as_str().ok_or_else(|| {
            ServiceError::InvalidArguments("Missing 'echomessage' argument".into())
        })?;

        debug!(echomessage = message, "test-echotest called");
        Ok(message.to_string())
    }
}

/// Returns the current date and time.
pub struct GetDateTime;

#[async_trait]
impl ServiceFunction for GetDateTime {
    fn name(&self) -> &str {
        "getdatetime"
    }

    fn description(&self) -> &str {
        "This function will return the current date and time."
    }

    async fn call(&self, _arguments: serde_json::Value) -> Result<String, ServiceError> {
        debug!("test-getdatetime called");
        Ok(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echotest_returns_message() {
        let out = EchoTest
            .call(serde_json::json!({"echomessage": "ping"}))
            .await
            .unwrap();
        assert_eq!(out, "ping");
    }

    #[tokio::test]
    async fn echotest_requires_message() {
        let err = EchoTest.call(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn getdatetime_is_rfc3339_utc() {
        let out = GetDateTime.call(serde_json::json!({})).await.unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(&out).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(out.ends_with('Z'));
    }

    #[test]
    fn getdatetime_takes_no_parameters() {
        assert_eq!(GetDateTime.parameters_schema(), serde_json::json!({}));
    }
}
