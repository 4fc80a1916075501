//! Error types for the invocation filter.

use thiserror::Error;

/// Errors raised while parsing filter settings at attach time.
///
/// Most bad settings are skipped with a log line rather than reported
/// here; only structural problems that would make the attachment
/// unusable are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
    /// A setting holds a structurally invalid value.
    #[error("invalid value for '{key}': {reason}")]
    Invalid {
        /// Setting name as it appears in the raw settings.
        key: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Errors raised by credential providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// The provider has nothing to offer (environment unset, profile
    /// absent). Chains move on to the next provider on this.
    #[error("{0}")]
    NotProvided(String),
    /// The backing credentials file could not be read or parsed.
    #[error("credentials file: {0}")]
    File(String),
    /// The identity token could not be read or exchanged.
    #[error("web identity: {0}")]
    WebIdentity(String),
}

/// Error raised by the host capability that decrypts stored secrets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decrypt failed: {0}")]
pub struct DecryptError(pub String);

/// Error returned by the transport seam while dispatching an invocation.
///
/// The executor treats every transport error as retryable, so no
/// classification is carried here beyond the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Human-readable cause.
    pub message: String,
}

impl TransportError {
    /// Create a new transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classification of a terminal invocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Mandatory configuration was missing at invocation time; no attempt
    /// was made.
    Configuration,
    /// Every attempt failed with a transport error.
    Transport,
    /// The function ran but reported an error of its own.
    Function,
    /// A response arrived carrying an HTTP status of 400 or above.
    HttpStatus,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Function => write!(f, "function"),
            FailureKind::HttpStatus => write!(f, "http-status"),
        }
    }
}
