//! Result attributes the filter writes back onto the request context.

/// Attribute names used when storing invocation results on the message.
pub mod attr {
    /// UTF-8 decoded response payload.
    pub const RESPONSE: &str = "aws.lambda.response";
    /// HTTP status of the function service response.
    pub const HTTP_STATUS_CODE: &str = "aws.lambda.http.status.code";
    /// Version of the function that actually ran.
    pub const EXECUTED_VERSION: &str = "aws.lambda.executed.version";
    /// Base64 log tail, when tail logging was requested.
    pub const LOG_RESULT: &str = "aws.lambda.log.result";
    /// Configured memory size echo.
    pub const MEMORY_SIZE: &str = "aws.lambda.memory.size";
    /// Error message for any failed invocation.
    pub const ERROR: &str = "aws.lambda.error";
    /// Error marker when the function itself failed.
    pub const FUNCTION_ERROR: &str = "aws.lambda.function.error";
}

/// The full attribute set one invocation writes back.
///
/// Unset fields are not written, so downstream filters can distinguish
/// "no response received" from an empty response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFields {
    /// Response payload as text.
    pub response: Option<String>,
    /// HTTP status of the service response.
    pub http_status: Option<u16>,
    /// Function version that ran.
    pub executed_version: Option<String>,
    /// Base64 log tail.
    pub log_result: Option<String>,
    /// Configured memory size echo, in MB.
    pub memory_size: Option<i64>,
    /// Error message; present on every failure path.
    pub error: Option<String>,
    /// Function-reported error marker.
    pub function_error: Option<String>,
}

impl OutputFields {
    /// Render as `(attribute name, value)` pairs for the host to store.
    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes = Vec::new();
        if let Some(response) = &self.response {
            attributes.push((attr::RESPONSE, response.clone()));
        }
        if let Some(status) = self.http_status {
            attributes.push((attr::HTTP_STATUS_CODE, status.to_string()));
        }
        if let Some(version) = &self.executed_version {
            attributes.push((attr::EXECUTED_VERSION, version.clone()));
        }
        if let Some(log) = &self.log_result {
            attributes.push((attr::LOG_RESULT, log.clone()));
        }
        if let Some(memory) = self.memory_size {
            attributes.push((attr::MEMORY_SIZE, memory.to_string()));
        }
        if let Some(error) = &self.error {
            attributes.push((attr::ERROR, error.clone()));
        }
        if let Some(function_error) = &self.function_error {
            attributes.push((attr::FUNCTION_ERROR, function_error.clone()));
        }
        attributes
    }
}
