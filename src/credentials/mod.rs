//! Layered credential resolution for the transport.

mod chain;
mod identity;
mod provider;
mod resolver;

pub use chain::ChainProvider;
pub use identity::{SessionCredentials, TokenExchange, WebIdentityProvider};
pub use provider::{
    Credentials, EnvironmentProvider, ProfileFileProvider, ProvideCredentials, StaticProvider,
};
pub use resolver::resolve_provider;
