//! The opaque RPC seam to the remote function service.

use crate::config::{InvocationType, LogType};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// One invocation handed to the transport.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Name or ARN of the target function.
    pub function_name: String,
    /// Region the client must be bound to for this call.
    pub region: String,
    /// Serialized JSON payload.
    pub payload: Bytes,
    /// How the function is invoked.
    pub invocation_type: InvocationType,
    /// Whether the execution log tail is requested.
    pub log_type: LogType,
    /// Optional version or alias qualifier.
    pub qualifier: Option<String>,
}

/// Raw result delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeOutput {
    /// Response payload bytes.
    pub payload: Bytes,
    /// HTTP status of the service response.
    pub status_code: u16,
    /// Version of the function that actually ran.
    pub executed_version: Option<String>,
    /// Base64 log tail, when requested.
    pub log_result: Option<String>,
    /// Error marker set when the function ran but failed internally.
    pub function_error: Option<String>,
}

impl InvokeOutput {
    /// Successful output with the given payload and status 200.
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            status_code: 200,
            executed_version: None,
            log_result: None,
            function_error: None,
        }
    }

    /// Set the HTTP status.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Set the executed version.
    pub fn with_executed_version(mut self, version: impl Into<String>) -> Self {
        self.executed_version = Some(version.into());
        self
    }

    /// Set the base64 log tail.
    pub fn with_log_result(mut self, log: impl Into<String>) -> Self {
        self.log_result = Some(log.into());
        self
    }

    /// Mark the output as a function-reported error.
    pub fn with_function_error(mut self, error: impl Into<String>) -> Self {
        self.function_error = Some(error.into());
        self
    }
}

/// Opaque client for the remote function service.
///
/// Implementations own client construction and may cache clients per
/// region; each call sees the region resolved for that invocation. Every
/// error returned here is treated as retryable by the caller.
#[async_trait]
pub trait FunctionTransport: Send + Sync {
    /// Dispatch one invocation.
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_builder() {
        let output = InvokeOutput::ok(r#"{"ok":true}"#)
            .with_status(200)
            .with_executed_version("$LATEST")
            .with_log_result("U1RBUlQ=");

        assert_eq!(output.status_code, 200);
        assert_eq!(output.executed_version.as_deref(), Some("$LATEST"));
        assert_eq!(output.function_error, None);
    }

    #[test]
    fn test_function_error_marker() {
        let output = InvokeOutput::ok("{}").with_function_error("Unhandled");
        assert_eq!(output.function_error.as_deref(), Some("Unhandled"));
    }
}
