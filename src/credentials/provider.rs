//! Credential material and the basic provider implementations.

use crate::error::CredentialsError;
use async_trait::async_trait;
use std::path::PathBuf;

/// An access/secret key pair with optional session token.
///
/// Secret material never appears in `Debug` output; only the access key
/// identifier is shown, with the secret parts masked.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an access/secret pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// The access key identifier.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret key.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// The session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("session_token", &self.session_token.as_deref().map(|_| "***"))
            .finish()
    }
}

/// A source of credentials the filter can call on every invocation.
///
/// Providers are shared across concurrent invocations and refresh
/// internally when their material goes stale.
#[async_trait]
pub trait ProvideCredentials: Send + Sync {
    /// Produce credentials, refreshing if needed.
    async fn provide(&self) -> Result<Credentials, CredentialsError>;

    /// Short provider name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Provider returning the same explicit credentials on every call.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    credentials: Credentials,
}

impl StaticProvider {
    /// Wrap explicit credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl ProvideCredentials for StaticProvider {
    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.credentials.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Provider reading `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
/// `AWS_SESSION_TOKEN` from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentProvider;

#[async_trait]
impl ProvideCredentials for EnvironmentProvider {
    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let access = env_value("AWS_ACCESS_KEY_ID");
        let secret = env_value("AWS_SECRET_ACCESS_KEY");
        match (access, secret) {
            (Some(access), Some(secret)) => {
                let mut credentials = Credentials::new(access, secret);
                if let Some(token) = env_value("AWS_SESSION_TOKEN") {
                    credentials = credentials.with_session_token(token);
                }
                Ok(credentials)
            }
            _ => Err(CredentialsError::NotProvided(
                "AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY not set".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Provider reading a named profile from an INI-style credentials file.
///
/// The file is re-read on every call, so key rotation on disk is picked
/// up without restarting the host.
#[derive(Debug, Clone)]
pub struct ProfileFileProvider {
    path: PathBuf,
    profile: String,
}

impl ProfileFileProvider {
    /// Profile looked up when none is configured.
    pub const DEFAULT_PROFILE: &'static str = "default";

    /// Read the default profile from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            profile: Self::DEFAULT_PROFILE.to_string(),
        }
    }

    /// Read a specific profile instead of the default.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Extract one profile's credentials from credentials-file text.
    fn parse_profile(text: &str, profile: &str) -> Option<Credentials> {
        let mut in_profile = false;
        let mut access_key = None;
        let mut secret_key = None;
        let mut session_token = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_profile = line[1..line.len() - 1].trim() == profile;
                continue;
            }
            if !in_profile {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_ascii_lowercase();
                let value = value.trim();
                match key.as_str() {
                    "aws_access_key_id" => access_key = Some(value.to_string()),
                    "aws_secret_access_key" => secret_key = Some(value.to_string()),
                    "aws_session_token" => session_token = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        match (access_key, secret_key) {
            (Some(access), Some(secret)) => {
                let mut credentials = Credentials::new(access, secret);
                if let Some(token) = session_token {
                    credentials = credentials.with_session_token(token);
                }
                Some(credentials)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl ProvideCredentials for ProfileFileProvider {
    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            CredentialsError::File(format!("cannot read {}: {}", self.path.display(), err))
        })?;

        Self::parse_profile(&text, &self.profile).ok_or_else(|| {
            CredentialsError::File(format!(
                "profile '{}' in {} has no usable key pair",
                self.profile,
                self.path.display()
            ))
        })
    }

    fn name(&self) -> &'static str {
        "profile-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FILE: &str = "\
# shared credentials
[default]
aws_access_key_id = AKIADEFAULT
aws_secret_access_key = defaultsecret

[staging]
aws_access_key_id = AKIASTAGING
aws_secret_access_key = stagingsecret
aws_session_token = stagingtoken
; trailing comment
";

    #[test]
    fn test_debug_masks_secret_material() {
        let credentials =
            Credentials::new("AKIAEXAMPLE", "wJalrXUtnFEMI").with_session_token("FQoGZXIva");
        let rendered = format!("{:?}", credentials);

        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
        assert!(!rendered.contains("FQoGZXIva"));
        assert!(rendered.contains("***"));
    }

    #[tokio::test]
    async fn test_static_provider_returns_its_credentials() {
        let provider = StaticProvider::new(Credentials::new("AKIA", "secret"));
        let credentials = provider.provide().await.unwrap();
        assert_eq!(credentials.access_key(), "AKIA");
        assert_eq!(provider.name(), "static");
    }

    #[test]
    fn test_parse_default_profile() {
        let credentials = ProfileFileProvider::parse_profile(SAMPLE_FILE, "default").unwrap();
        assert_eq!(credentials.access_key(), "AKIADEFAULT");
        assert_eq!(credentials.secret_key(), "defaultsecret");
        assert_eq!(credentials.session_token(), None);
    }

    #[test]
    fn test_parse_named_profile_with_token() {
        let credentials = ProfileFileProvider::parse_profile(SAMPLE_FILE, "staging").unwrap();
        assert_eq!(credentials.access_key(), "AKIASTAGING");
        assert_eq!(credentials.session_token(), Some("stagingtoken"));
    }

    #[test]
    fn test_parse_missing_profile() {
        assert!(ProfileFileProvider::parse_profile(SAMPLE_FILE, "production").is_none());
    }

    #[test]
    fn test_parse_profile_missing_secret() {
        let partial = "[default]\naws_access_key_id = AKIA\n";
        assert!(ProfileFileProvider::parse_profile(partial, "default").is_none());
    }

    #[tokio::test]
    async fn test_profile_provider_reads_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_FILE.as_bytes()).unwrap();

        let provider = ProfileFileProvider::new(file.path()).with_profile("staging");
        let credentials = provider.provide().await.unwrap();
        assert_eq!(credentials.access_key(), "AKIASTAGING");
    }

    #[tokio::test]
    async fn test_profile_provider_missing_file() {
        let provider = ProfileFileProvider::new("/nonexistent/credentials");
        let err = provider.provide().await.unwrap_err();
        assert!(matches!(err, CredentialsError::File(_)));
    }
}
