//! Workload identity: token file plus exchange for short-lived credentials.

use crate::credentials::provider::{Credentials, ProvideCredentials};
use crate::error::CredentialsError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Short-lived credentials together with their expiry instant.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    /// The credential material.
    pub credentials: Credentials,
    /// When the material stops being valid.
    pub expires_at: SystemTime,
}

/// Seam for trading a workload identity token for short-lived
/// credentials; the wire call to the token service lives behind it.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange `token` for credentials scoped to `role_arn`.
    async fn exchange(
        &self,
        role_arn: &str,
        token: &str,
    ) -> Result<SessionCredentials, CredentialsError>;
}

/// Provider that reads a workload identity token from disk and exchanges
/// it for short-lived credentials, refreshing before expiry.
///
/// Exchanged credentials are cached until they come within the refresh
/// margin of expiry; every invocation after that re-reads the token file
/// and exchanges again, so token rotation on disk is picked up.
pub struct WebIdentityProvider {
    token_file: PathBuf,
    role_arn: String,
    exchange: Arc<dyn TokenExchange>,
    cached: RwLock<Option<SessionCredentials>>,
}

impl WebIdentityProvider {
    /// Freshness margin subtracted from the expiry when deciding whether
    /// to refresh.
    const REFRESH_MARGIN: Duration = Duration::from_secs(60);

    /// Create a provider for a token file and role.
    pub fn new(
        token_file: impl Into<PathBuf>,
        role_arn: impl Into<String>,
        exchange: Arc<dyn TokenExchange>,
    ) -> Self {
        Self {
            token_file: token_file.into(),
            role_arn: role_arn.into(),
            exchange,
            cached: RwLock::new(None),
        }
    }

    /// Build from the conventional environment variables
    /// (`AWS_WEB_IDENTITY_TOKEN_FILE`, `AWS_ROLE_ARN`).
    ///
    /// Returns `None` when either variable is absent, which callers treat
    /// as "workload identity not available here".
    pub fn from_env(exchange: Arc<dyn TokenExchange>) -> Option<Self> {
        let token_file = std::env::var("AWS_WEB_IDENTITY_TOKEN_FILE")
            .ok()
            .filter(|value| !value.is_empty())?;
        let role_arn = std::env::var("AWS_ROLE_ARN")
            .ok()
            .filter(|value| !value.is_empty())?;
        info!("Workload identity detected, role '{}'", role_arn);
        Some(Self::new(token_file, role_arn, exchange))
    }

    fn is_fresh(session: &SessionCredentials) -> bool {
        match session.expires_at.duration_since(SystemTime::now()) {
            Ok(remaining) => remaining > Self::REFRESH_MARGIN,
            Err(_) => false,
        }
    }

    async fn refresh(&self) -> Result<Credentials, CredentialsError> {
        let mut cached = self.cached.write().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(session) = cached.as_ref() {
            if Self::is_fresh(session) {
                return Ok(session.credentials.clone());
            }
        }

        let token = tokio::fs::read_to_string(&self.token_file)
            .await
            .map_err(|err| {
                CredentialsError::WebIdentity(format!(
                    "cannot read token file {}: {}",
                    self.token_file.display(),
                    err
                ))
            })?;

        let session = self.exchange.exchange(&self.role_arn, token.trim()).await?;
        debug!("Exchanged identity token for session credentials");
        let credentials = session.credentials.clone();
        *cached = Some(session);
        Ok(credentials)
    }
}

#[async_trait]
impl ProvideCredentials for WebIdentityProvider {
    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        if let Some(session) = self.cached.read().await.as_ref() {
            if Self::is_fresh(session) {
                return Ok(session.credentials.clone());
            }
        }
        self.refresh().await
    }

    fn name(&self) -> &'static str {
        "web-identity"
    }
}
