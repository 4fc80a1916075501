//! Resolved filter configuration, parsed once at attach time.

use crate::config::{ClientConfig, DecryptSecret, RawSettings, Template};
use crate::credentials::Credentials;
use crate::error::ConfigError;
use crate::payload::FieldMapping;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default inter-attempt delay in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default memory size echo in MB.
pub const DEFAULT_MEMORY_SIZE_MB: i64 = 128;

/// How the remote function is invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    /// Synchronous call that waits for the function result.
    #[default]
    RequestResponse,
    /// Asynchronous fire-and-forget event.
    Event,
    /// Validation-only call that never runs the function.
    DryRun,
}

impl InvocationType {
    /// Wire name of the invocation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
            InvocationType::Event => "Event",
            InvocationType::DryRun => "DryRun",
        }
    }

    /// Parse a configured invocation type.
    pub fn parse(value: &str) -> Option<InvocationType> {
        if value.eq_ignore_ascii_case("RequestResponse") {
            Some(InvocationType::RequestResponse)
        } else if value.eq_ignore_ascii_case("Event") {
            Some(InvocationType::Event)
        } else if value.eq_ignore_ascii_case("DryRun") {
            Some(InvocationType::DryRun)
        } else {
            None
        }
    }

    fn parse_or_default(value: Option<&str>) -> InvocationType {
        match value {
            None => InvocationType::default(),
            Some(value) => InvocationType::parse(value).unwrap_or_else(|| {
                warn!("Unknown invocation type '{}', using RequestResponse", value);
                InvocationType::default()
            }),
        }
    }
}

impl std::fmt::Display for InvocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the execution log tail is requested with the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    /// No log capture.
    #[default]
    None,
    /// Return the tail of the execution log, base64 encoded.
    Tail,
}

impl LogType {
    /// Wire name of the log type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::None => "None",
            LogType::Tail => "Tail",
        }
    }

    /// Parse a configured log type.
    pub fn parse(value: &str) -> Option<LogType> {
        if value.eq_ignore_ascii_case("None") {
            Some(LogType::None)
        } else if value.eq_ignore_ascii_case("Tail") {
            Some(LogType::Tail)
        } else {
            None
        }
    }

    fn parse_or_default(value: Option<&str>) -> LogType {
        match value {
            None => LogType::default(),
            Some(value) => LogType::parse(value).unwrap_or_else(|| {
                warn!("Unknown log type '{}', using None", value);
                LogType::default()
            }),
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which credential source the filter should build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialStrategy {
    /// Explicit credentials attached to the filter configuration.
    #[default]
    Explicit,
    /// A named profile in a credentials file on disk.
    FileProfile,
    /// Workload identity token exchanged for short-lived credentials.
    WorkloadIdentity,
}

impl CredentialStrategy {
    /// Parse a configured strategy; legacy spellings are accepted.
    pub fn parse(value: &str) -> Option<CredentialStrategy> {
        if value.eq_ignore_ascii_case("explicit") || value.eq_ignore_ascii_case("local") {
            Some(CredentialStrategy::Explicit)
        } else if value.eq_ignore_ascii_case("file-profile") || value.eq_ignore_ascii_case("file") {
            Some(CredentialStrategy::FileProfile)
        } else if value.eq_ignore_ascii_case("workload-identity") || value.eq_ignore_ascii_case("iam")
        {
            Some(CredentialStrategy::WorkloadIdentity)
        } else {
            None
        }
    }

    fn parse_or_default(value: Option<&str>) -> CredentialStrategy {
        match value {
            None => CredentialStrategy::default(),
            Some(value) => CredentialStrategy::parse(value).unwrap_or_else(|| {
                warn!("Unknown credential type '{}', using explicit", value);
                CredentialStrategy::default()
            }),
        }
    }
}

impl std::fmt::Display for CredentialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialStrategy::Explicit => write!(f, "explicit"),
            CredentialStrategy::FileProfile => write!(f, "file-profile"),
            CredentialStrategy::WorkloadIdentity => write!(f, "workload-identity"),
        }
    }
}

/// Resolved configuration for one filter attachment.
///
/// Built once from [`RawSettings`] when the filter attaches, immutable
/// afterwards, and shared read-only across concurrent invocations.
/// Defaults are applied here, in one place.
#[derive(Debug, Clone)]
pub struct InvocationConfig {
    /// Name or ARN of the target function; may reference attributes.
    pub function_name: Template,
    /// Target region; may reference attributes.
    pub region: Template,
    /// Invocation mode.
    pub invocation_type: InvocationType,
    /// Log capture mode.
    pub log_type: LogType,
    /// Optional version or alias qualifier; may reference attributes.
    pub qualifier: Option<Template>,
    /// Fixed inter-attempt delay in milliseconds.
    pub retry_delay_ms: u64,
    /// Memory size echo in MB, written back with each result.
    pub memory_size_mb: i64,
    /// Which credential source to build.
    pub credential_strategy: CredentialStrategy,
    /// Credentials file for the file-profile strategy.
    pub credentials_file: Option<PathBuf>,
    /// Profile name within the credentials file.
    pub credentials_profile: Option<String>,
    /// Explicit credentials, when configured.
    pub explicit_credentials: Option<Credentials>,
    /// Transport client options.
    pub client: ClientConfig,
    /// Facet-to-path payload mapping.
    pub mapping: FieldMapping,
}

impl InvocationConfig {
    /// Parse raw settings into a resolved configuration.
    ///
    /// Absent optional settings take their documented defaults here,
    /// once. Only structural problems fail the attachment; everything
    /// else degrades with a log line.
    pub fn from_settings(
        settings: &RawSettings,
        decrypt: &dyn DecryptSecret,
    ) -> Result<InvocationConfig, ConfigError> {
        let function_name = Template::new(settings.get("functionName").unwrap_or_default());
        let region = Template::new(settings.get("awsRegion").unwrap_or_default());
        let invocation_type = InvocationType::parse_or_default(settings.get("invocationType"));
        let log_type = LogType::parse_or_default(settings.get("logType"));
        let qualifier = settings.get("qualifier").map(Template::new);
        let retry_delay_ms = settings
            .get_parsed("retryDelay")
            .unwrap_or(DEFAULT_RETRY_DELAY_MS);
        let memory_size_mb = settings
            .get_parsed("memorySize")
            .unwrap_or(DEFAULT_MEMORY_SIZE_MB);

        let credential_strategy = CredentialStrategy::parse_or_default(settings.get("credentialType"));
        let credentials_file = match settings.get("credentialsFilePath") {
            Some(path) if path.contains('\0') => {
                return Err(ConfigError::Invalid {
                    key: "credentialsFilePath",
                    reason: "path contains a NUL byte".to_string(),
                });
            }
            Some(path) => Some(PathBuf::from(path)),
            None => None,
        };
        let credentials_profile = settings.get("credentialsProfile").map(str::to_string);

        let explicit_credentials = match (settings.get("accessKey"), settings.get("secretKey")) {
            (Some(access), Some(secret)) => {
                let mut credentials = Credentials::new(access, secret);
                if let Some(token) = settings.get("sessionToken") {
                    credentials = credentials.with_session_token(token);
                }
                Some(credentials)
            }
            (None, None) => None,
            _ => {
                warn!("Ignoring half-configured explicit credentials (need both accessKey and secretKey)");
                None
            }
        };

        let client = ClientConfig::from_settings(settings, decrypt);

        let mapping = FieldMapping::new()
            .method(settings.get("payloadMethodPath").unwrap_or_default())
            .headers(settings.get("payloadHeadersPath").unwrap_or_default())
            .body(settings.get("payloadBodyPath").unwrap_or_default())
            .uri(settings.get("payloadUriPath").unwrap_or_default())
            .query_string(settings.get("payloadQueryStringPath").unwrap_or_default())
            .path_params(settings.get("payloadPathParamsPath").unwrap_or_default());

        let config = InvocationConfig {
            function_name,
            region,
            invocation_type,
            log_type,
            qualifier,
            retry_delay_ms,
            memory_size_mb,
            credential_strategy,
            credentials_file,
            credentials_profile,
            explicit_credentials,
            client,
            mapping,
        };

        info!(
            "Invoke filter configured: function='{}' region='{}' type={} log={} credentials={}",
            config.function_name.literal(),
            config.region.literal(),
            config.invocation_type,
            config.log_type,
            config.credential_strategy
        );
        debug!(
            "Retry delay {}ms, memory size {}MB, payload mapping {}",
            config.retry_delay_ms,
            config.memory_size_mb,
            if config.mapping.is_empty() { "empty" } else { "configured" }
        );

        Ok(config)
    }
}
