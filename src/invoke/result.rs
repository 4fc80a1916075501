//! Classification of raw transport output into the final outcome.

use crate::error::FailureKind;
use crate::http::OutputFields;
use crate::invoke::transport::InvokeOutput;
use tracing::{error, info};

/// Response-derived fields shared by success and partial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFields {
    /// UTF-8 decoded response payload.
    pub response: String,
    /// HTTP status of the service response.
    pub http_status: u16,
    /// Version of the function that ran.
    pub executed_version: Option<String>,
    /// Base64 log tail, when requested.
    pub log_tail: Option<String>,
}

/// Final verdict of one invocation.
///
/// Failures that still carried a reply (a function-reported error, an
/// HTTP status of 400 or above) keep their response fields, so callers
/// can write back everything they know alongside the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The function ran and reported no error.
    Success {
        /// Response fields.
        response: ResponseFields,
        /// Attempts performed, counting the successful one.
        attempts: u32,
    },
    /// The invocation failed terminally.
    Failure {
        /// Failure classification.
        kind: FailureKind,
        /// Error message written back to the context.
        message: String,
        /// Attempts performed; zero when no attempt was made.
        attempts: u32,
        /// Response context, when a reply was received.
        response: Option<ResponseFields>,
    },
}

impl InvocationOutcome {
    /// Failure raised before any attempt could be made.
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        InvocationOutcome::Failure {
            kind: FailureKind::Configuration,
            message: message.into(),
            attempts: 0,
            response: None,
        }
    }

    /// Failure after the attempt loop ran out.
    pub(crate) fn exhausted(last_error: impl std::fmt::Display, attempts: u32) -> Self {
        InvocationOutcome::Failure {
            kind: FailureKind::Transport,
            message: format!("Failure after {} attempts: {}", attempts, last_error),
            attempts,
            response: None,
        }
    }

    /// Whether the invocation completed without an error.
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success { .. })
    }

    /// Attempts performed before the verdict.
    pub fn attempts(&self) -> u32 {
        match self {
            InvocationOutcome::Success { attempts, .. } => *attempts,
            InvocationOutcome::Failure { attempts, .. } => *attempts,
        }
    }

    /// The error message, on failure paths.
    pub fn error(&self) -> Option<&str> {
        match self {
            InvocationOutcome::Success { .. } => None,
            InvocationOutcome::Failure { message, .. } => Some(message),
        }
    }

    /// The response fields, when a reply was received.
    pub fn response(&self) -> Option<&ResponseFields> {
        match self {
            InvocationOutcome::Success { response, .. } => Some(response),
            InvocationOutcome::Failure { response, .. } => response.as_ref(),
        }
    }

    /// Render the write-back attribute set, echoing the configured memory
    /// size whenever a reply was processed.
    pub fn output_fields(&self, memory_size_mb: i64) -> OutputFields {
        let mut fields = OutputFields::default();

        if let Some(response) = self.response() {
            fields.response = Some(response.response.clone());
            fields.http_status = Some(response.http_status);
            fields.executed_version = response.executed_version.clone();
            fields.log_result = response.log_tail.clone();
            fields.memory_size = Some(memory_size_mb);
        }

        if let InvocationOutcome::Failure { kind, message, .. } = self {
            fields.error = Some(message.clone());
            if *kind == FailureKind::Function {
                fields.function_error = Some(message.clone());
            }
        }

        fields
    }
}

/// Classify a raw reply into the final outcome.
///
/// A reply can still fail two ways: the function itself reported an
/// error, or the service answered with an HTTP status of 400 or above.
/// Either marks the invocation unsuccessful even though response fields
/// are available.
pub fn map_result(output: InvokeOutput, attempts: u32) -> InvocationOutcome {
    let function_error = output.function_error;
    let response = ResponseFields {
        response: String::from_utf8_lossy(&output.payload).to_string(),
        http_status: output.status_code,
        executed_version: output.executed_version,
        log_tail: output.log_result,
    };

    if let Some(message) = function_error {
        error!("Function reported an error: {}", message);
        return InvocationOutcome::Failure {
            kind: FailureKind::Function,
            message,
            attempts,
            response: Some(response),
        };
    }

    if response.http_status >= 400 {
        error!("HTTP error in function invocation: {}", response.http_status);
        return InvocationOutcome::Failure {
            kind: FailureKind::HttpStatus,
            message: format!("HTTP Error: {}", response.http_status),
            attempts,
            response: Some(response),
        };
    }

    info!(
        "Function invocation successful, status {} version {}",
        response.http_status,
        response.executed_version.as_deref().unwrap_or("-")
    );
    InvocationOutcome::Success { response, attempts }
}
