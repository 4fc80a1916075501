//! In-process transport serving named local functions.

use crate::error::TransportError;
use crate::invoke::transport::{FunctionTransport, InvokeOutput, InvokeRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Handler signature for local functions.
pub type LocalHandler =
    Box<dyn Fn(&InvokeRequest) -> Result<InvokeOutput, TransportError> + Send + Sync>;

/// Transport that dispatches to in-process functions by name.
///
/// Stands in for the remote service during development and in tests; an
/// unknown function name fails the same way an unreachable remote would,
/// so retry behavior stays observable.
#[derive(Default)]
pub struct LocalFunctions {
    functions: RwLock<HashMap<String, LocalHandler>>,
}

impl LocalFunctions {
    /// Create an empty function table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a function name, replacing any previous
    /// handler with that name.
    pub async fn register<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&InvokeRequest) -> Result<InvokeOutput, TransportError> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut functions = self.functions.write().await;
        if functions.insert(name.clone(), Box::new(handler)).is_some() {
            debug!("Replaced local function: {}", name);
        } else {
            info!("Registered local function: {}", name);
        }
    }

    /// List registered function names.
    pub async fn list(&self) -> Vec<String> {
        let functions = self.functions.read().await;
        functions.keys().cloned().collect()
    }
}

#[async_trait]
impl FunctionTransport for LocalFunctions {
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, TransportError> {
        let functions = self.functions.read().await;
        let handler = functions.get(&request.function_name).ok_or_else(|| {
            TransportError::new(format!(
                "function '{}' is not registered",
                request.function_name
            ))
        })?;
        debug!(
            "Dispatching local invocation of '{}' ({} bytes)",
            request.function_name,
            request.payload.len()
        );
        handler(request)
    }
}
