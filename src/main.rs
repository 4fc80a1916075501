//! lamgate gateway - demo server with local functions.
//!
//! Runs the invocation filter behind an HTTP front, dispatching to
//! in-process functions so the full pipeline can be exercised without a
//! remote function service.

use lamgate::payload::get_path;
use lamgate::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting lamgate gateway...");

    let functions = Arc::new(LocalFunctions::new());

    // Echoes the assembled payload straight back.
    functions
        .register("echo", |request: &InvokeRequest| {
            Ok(InvokeOutput::ok(request.payload.clone()).with_executed_version("$LATEST"))
        })
        .await;

    // Reads the mapped query facet out of the payload.
    functions
        .register("greet", |request: &InvokeRequest| {
            let payload: serde_json::Value = serde_json::from_slice(&request.payload)
                .map_err(|err| TransportError::new(format!("bad payload: {}", err)))?;
            let name = get_path(&payload, "request.query.name")
                .and_then(|value| value.as_str())
                .unwrap_or("World");
            let body = serde_json::json!({ "message": format!("Hello, {}!", name) });
            Ok(InvokeOutput::ok(body.to_string()).with_executed_version("$LATEST"))
        })
        .await;

    // Fails twice out of every three calls to show the retry loop.
    let calls = Arc::new(AtomicUsize::new(0));
    functions
        .register("unstable", move |_request: &InvokeRequest| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call % 3 == 0 {
                Ok(InvokeOutput::ok(r#"{"ok":true}"#))
            } else {
                Err(TransportError::new("simulated transient failure"))
            }
        })
        .await;

    // Filter settings the way a host pipeline would deliver them; the
    // function name template routes on the first path segment.
    let settings = RawSettings::new()
        .set("functionName", "${gateway.function}")
        .set("awsRegion", "local")
        .set("retryDelay", "250")
        .set("credentialType", "explicit")
        .set("accessKey", "local-access")
        .set("secretKey", "local-secret")
        .set("payloadMethodPath", "request.method")
        .set("payloadUriPath", "request.path")
        .set("payloadHeadersPath", "request.headers")
        .set("payloadQueryStringPath", "request.query")
        .set("payloadBodyPath", "request.body");

    let transport: Arc<dyn FunctionTransport> = functions.clone();
    let filter = InvokeFilter::attach(&settings, transport)?;

    let config = GatewayConfig::new().host("0.0.0.0").port(8080);
    let server = GatewayServer::new(config, filter);

    tracing::info!("Registered local functions: echo, greet, unstable");
    tracing::info!("Try: curl -X POST http://localhost:8080/echo -H 'Content-Type: application/json' -d '{{\"order\": 42}}'");
    tracing::info!("Try: curl 'http://localhost:8080/greet?name=Ada'");
    tracing::info!("Try: curl http://localhost:8080/unstable");
    tracing::info!("Health check: curl http://localhost:8080/_health");

    // Run the server
    server.run().await
}
