//! The invocation filter: configured once, executed per request.

use crate::config::{DecryptSecret, InvocationConfig, NoopDecrypt, RawSettings};
use crate::credentials::{resolve_provider, ProvideCredentials, TokenExchange};
use crate::error::ConfigError;
use crate::http::RequestFacets;
use crate::invoke::{AttemptResult, FunctionTransport, InvocationOutcome, InvokeRequest, Invoker};
use crate::payload;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A configured function-invocation filter.
///
/// Built once when the host attaches it to a pipeline, then shared
/// read-only across concurrent requests; every [`execute`] call is
/// independent.
///
/// [`execute`]: InvokeFilter::execute
pub struct InvokeFilter {
    config: Arc<InvocationConfig>,
    provider: Arc<dyn ProvideCredentials>,
    invoker: Invoker,
}

impl InvokeFilter {
    /// Attach with default collaborators: cleartext settings and no
    /// workload identity token exchange.
    pub fn attach(
        settings: &RawSettings,
        transport: Arc<dyn FunctionTransport>,
    ) -> Result<InvokeFilter, ConfigError> {
        Self::attach_with(settings, transport, &NoopDecrypt, None)
    }

    /// Attach with host collaborators for secret decryption and workload
    /// identity token exchange.
    pub fn attach_with(
        settings: &RawSettings,
        transport: Arc<dyn FunctionTransport>,
        decrypt: &dyn DecryptSecret,
        token_exchange: Option<Arc<dyn TokenExchange>>,
    ) -> Result<InvokeFilter, ConfigError> {
        let config = InvocationConfig::from_settings(settings, decrypt)?;
        Ok(Self::new(config, token_exchange, transport))
    }

    /// Build from an already-resolved configuration.
    pub fn new(
        config: InvocationConfig,
        token_exchange: Option<Arc<dyn TokenExchange>>,
        transport: Arc<dyn FunctionTransport>,
    ) -> InvokeFilter {
        let provider = resolve_provider(&config, token_exchange);
        let invoker = Invoker::new(transport, Duration::from_millis(config.retry_delay_ms));
        Self {
            config: Arc::new(config),
            provider,
            invoker,
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &InvocationConfig {
        &self.config
    }

    /// The credential provider the filter resolved at attach time.
    pub fn credentials_provider(&self) -> Arc<dyn ProvideCredentials> {
        self.provider.clone()
    }

    /// Run one invocation against the facets of an in-flight request.
    ///
    /// Never returns an error: every failure path is folded into the
    /// outcome, so the host always has an error field to write back.
    pub async fn execute(&self, facets: &RequestFacets) -> InvocationOutcome {
        let lookup = |name: &str| facets.attributes.get(name).cloned();

        // Mandatory per-invocation fields; checked before any attempt.
        let function_name = self.config.function_name.resolve(&lookup);
        if function_name.trim().is_empty() {
            warn!("Function name resolved empty, invocation aborted");
            return InvocationOutcome::configuration("function name is not configured");
        }
        let region = self.config.region.resolve(&lookup);
        if region.trim().is_empty() {
            warn!("Region resolved empty, invocation aborted");
            return InvocationOutcome::configuration("region is not configured");
        }
        let qualifier = self
            .config
            .qualifier
            .as_ref()
            .map(|template| template.resolve(&lookup))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        // Probe the provider up front so credential problems show in the
        // log before the first attempt; the probe itself is not fatal.
        match self.provider.provide().await {
            Ok(credentials) => {
                debug!(
                    "Credentials from '{}' provider: {:?}",
                    self.provider.name(),
                    credentials
                );
            }
            Err(err) => {
                warn!(
                    "No credentials available from '{}' provider: {}",
                    self.provider.name(),
                    err
                );
            }
        }

        let request = InvokeRequest {
            function_name,
            region,
            payload: payload::assemble(facets, &self.config.mapping),
            invocation_type: self.config.invocation_type,
            log_type: self.config.log_type,
            qualifier,
        };
        debug!(
            "Invoking '{}' in region '{}' with {} byte payload",
            request.function_name,
            request.region,
            request.payload.len()
        );

        match self.invoker.run(&request).await {
            AttemptResult::Completed { output, attempts } => {
                crate::invoke::map_result(output, attempts)
            }
            AttemptResult::Exhausted {
                last_error,
                attempts,
            } => InvocationOutcome::exhausted(last_error, attempts),
        }
    }
}
