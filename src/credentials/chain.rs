//! Ordered fallback across credential providers.

use crate::credentials::provider::{
    Credentials, EnvironmentProvider, ProfileFileProvider, ProvideCredentials,
};
use crate::error::CredentialsError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Provider trying a list of sources in order; the first success wins.
///
/// Member failures are expected and logged at debug level only. The
/// chain itself fails when every member does, which callers surface at
/// invocation time rather than at attach time.
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Arc<dyn ProvideCredentials>>,
}

impl ChainProvider {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider to the chain.
    pub fn push(mut self, provider: Arc<dyn ProvideCredentials>) -> Self {
        self.providers.push(provider);
        self
    }

    /// The ambient default chain: process environment first, then the
    /// conventional credentials file location.
    pub fn ambient() -> Self {
        let mut chain = ChainProvider::new().push(Arc::new(EnvironmentProvider));
        if let Some(path) = default_credentials_file() {
            chain = chain.push(Arc::new(ProfileFileProvider::new(path)));
        }
        chain
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// The conventional credentials file location, honoring the
/// `AWS_SHARED_CREDENTIALS_FILE` override.
fn default_credentials_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".aws").join("credentials"))
}

#[async_trait]
impl ProvideCredentials for ChainProvider {
    async fn provide(&self) -> Result<Credentials, CredentialsError> {
        for provider in &self.providers {
            match provider.provide().await {
                Ok(credentials) => {
                    debug!("Credentials resolved by '{}' provider", provider.name());
                    return Ok(credentials);
                }
                Err(err) => {
                    debug!("Provider '{}' has no credentials: {}", provider.name(), err);
                }
            }
        }
        Err(CredentialsError::NotProvided(
            "no provider in the chain produced credentials".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "default-chain"
    }
}
