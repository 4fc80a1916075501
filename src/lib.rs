//! # lamgate - serverless function invocation filter
//!
//! lamgate is a gateway-side filter that forwards in-flight API requests
//! to a remote serverless function: it resolves credentials in layers,
//! assembles a JSON payload from configurable request facets, invokes the
//! function through an opaque transport with bounded retries, and maps
//! the result into attributes the host pipeline writes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    API Gateway Pipeline                    │
//! │              (routing, auth, policy filters)               │
//! └────────────────────────────────────────────────────────────┘
//!                               │ request facets
//!                               ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                        InvokeFilter                        │
//! │  ┌────────────┐   ┌────────────┐   ┌───────────────────┐   │
//! │  │ credential │   │  payload   │   │      invoker      │   │
//! │  │ resolution │   │  assembly  │   │ (bounded retries) │   │
//! │  └────────────┘   └────────────┘   └───────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//!                               │ FunctionTransport (opaque RPC)
//!                               ▼
//!                   remote serverless function
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lamgate::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // In-process stand-in for the remote function service
//!     let functions = Arc::new(LocalFunctions::new());
//!     functions
//!         .register("echo", |request: &InvokeRequest| {
//!             Ok(InvokeOutput::ok(request.payload.clone()))
//!         })
//!         .await;
//!
//!     // Configure the filter the way a host pipeline would
//!     let settings = RawSettings::new()
//!         .set("functionName", "echo")
//!         .set("awsRegion", "local")
//!         .set("payloadBodyPath", "input");
//!
//!     let filter = InvokeFilter::attach(&settings, functions)?;
//!
//!     // Run one invocation against request facets
//!     let facets = RequestFacets::new().body(r#"{"order": 42}"#, "application/json");
//!     let outcome = filter.execute(&facets).await;
//!     assert!(outcome.is_success());
//!     Ok(())
//! }
//! ```
//!
//! ## Invocation outcome
//!
//! [`InvokeFilter::execute`] never returns an error. Every failure path is
//! folded into an [`InvocationOutcome`]:
//!
//! 1. **Configuration**: region or function name resolved empty; no attempt made
//! 2. **Transport**: every attempt failed; message carries the last error
//! 3. **Function**: the function ran and reported an error of its own
//! 4. **HttpStatus**: the service answered with status 400 or above
//!
//! Successful outcomes and reply-carrying failures expose the response
//! payload, HTTP status, executed version and log tail for write-back.

pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod http;
pub mod invoke;
pub mod payload;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::{
        ClientConfig, InvocationConfig, InvocationType, LogType, RawSettings,
    };
    pub use crate::credentials::{Credentials, ProvideCredentials, TokenExchange};
    pub use crate::error::{ConfigError, CredentialsError, FailureKind, TransportError};
    pub use crate::filter::InvokeFilter;
    pub use crate::http::{OutputFields, RequestFacets};
    pub use crate::invoke::{
        FunctionTransport, InvocationOutcome, InvokeOutput, InvokeRequest, LocalFunctions,
    };
    pub use crate::runtime::{GatewayConfig, GatewayServer};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use config::{InvocationConfig, RawSettings};
pub use filter::InvokeFilter;
pub use http::{OutputFields, RequestFacets};
pub use invoke::{FunctionTransport, InvocationOutcome};
pub use runtime::{GatewayConfig, GatewayServer};
