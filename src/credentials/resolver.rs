//! Strategy dispatch from configuration to a concrete credential provider.

use crate::config::{CredentialStrategy, InvocationConfig};
use crate::credentials::chain::ChainProvider;
use crate::credentials::identity::{TokenExchange, WebIdentityProvider};
use crate::credentials::provider::{ProfileFileProvider, ProvideCredentials, StaticProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the credential provider the configuration asks for.
///
/// Never fails: when the chosen strategy cannot be built (no explicit
/// credentials attached, no file path, no workload identity in the
/// environment), the cause is logged and the ambient default chain is
/// substituted. Whether that chain can actually produce credentials is
/// only known at invocation time.
pub fn resolve_provider(
    config: &InvocationConfig,
    token_exchange: Option<Arc<dyn TokenExchange>>,
) -> Arc<dyn ProvideCredentials> {
    match config.credential_strategy {
        CredentialStrategy::Explicit => match &config.explicit_credentials {
            Some(credentials) => {
                info!("Using explicit credentials, access key '{}'", credentials.access_key());
                Arc::new(StaticProvider::new(credentials.clone()))
            }
            None => {
                warn!("Explicit credentials selected but none attached, using the default chain");
                Arc::new(ChainProvider::ambient())
            }
        },
        CredentialStrategy::FileProfile => match &config.credentials_file {
            Some(path) => {
                info!("Using credentials file {}", path.display());
                let mut provider = ProfileFileProvider::new(path);
                if let Some(profile) = &config.credentials_profile {
                    provider = provider.with_profile(profile);
                }
                Arc::new(provider)
            }
            None => {
                warn!("Credentials file path not specified, using the default chain");
                Arc::new(ChainProvider::ambient())
            }
        },
        CredentialStrategy::WorkloadIdentity => {
            let provider = token_exchange.and_then(WebIdentityProvider::from_env);
            match provider {
                Some(provider) => Arc::new(provider),
                None => {
                    info!("Workload identity not available, using the default chain");
                    Arc::new(ChainProvider::ambient())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NoopDecrypt, RawSettings};

    fn config_from(settings: RawSettings) -> InvocationConfig {
        InvocationConfig::from_settings(&settings, &NoopDecrypt).unwrap()
    }

    #[tokio::test]
    async fn test_explicit_strategy_builds_static_provider() {
        let config = config_from(
            RawSettings::new()
                .set("credentialType", "explicit")
                .set("accessKey", "AKIAEXAMPLE")
                .set("secretKey", "topsecret"),
        );

        let provider = resolve_provider(&config, None);
        assert_eq!(provider.name(), "static");
        let credentials = provider.provide().await.unwrap();
        assert_eq!(credentials.access_key(), "AKIAEXAMPLE");
    }

    #[test]
    fn test_explicit_strategy_without_credentials_falls_back() {
        let config = config_from(RawSettings::new().set("credentialType", "explicit"));
        let provider = resolve_provider(&config, None);
        assert_eq!(provider.name(), "default-chain");
    }

    #[test]
    fn test_file_strategy_builds_profile_provider() {
        let config = config_from(
            RawSettings::new()
                .set("credentialType", "file")
                .set("credentialsFilePath", "/etc/gateway/credentials")
                .set("credentialsProfile", "staging"),
        );

        let provider = resolve_provider(&config, None);
        assert_eq!(provider.name(), "profile-file");
    }

    #[test]
    fn test_file_strategy_without_path_falls_back() {
        let config = config_from(RawSettings::new().set("credentialType", "file"));
        let provider = resolve_provider(&config, None);
        assert_eq!(provider.name(), "default-chain");
    }

    #[test]
    fn test_workload_identity_without_exchange_falls_back() {
        let config = config_from(RawSettings::new().set("credentialType", "iam"));
        let provider = resolve_provider(&config, None);
        assert_eq!(provider.name(), "default-chain");
    }
}
