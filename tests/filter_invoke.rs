//! Integration tests for the invocation filter pipeline.

use lamgate::http::attr;
use lamgate::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Transport that records every request and replays scripted results.
///
/// Once the script runs out it answers with a plain `{}` success, so
/// tests only script the interesting part.
struct ScriptedTransport {
    requests: Mutex<Vec<InvokeRequest>>,
    script: Mutex<VecDeque<Result<InvokeOutput, TransportError>>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
        }
    }

    fn respond_with(self, output: InvokeOutput) -> Self {
        self.script.lock().unwrap().push_back(Ok(output));
        self
    }

    fn fail_with(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
        self
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> Option<InvokeRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl FunctionTransport for ScriptedTransport {
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(InvokeOutput::ok("{}")),
        }
    }
}

fn base_settings() -> RawSettings {
    RawSettings::new()
        .set("functionName", "orders")
        .set("awsRegion", "eu-west-1")
        .set("retryDelay", "0")
}

fn payload_json(request: &InvokeRequest) -> serde_json::Value {
    serde_json::from_slice(&request.payload).unwrap()
}

#[tokio::test]
async fn test_payload_assembled_from_mapped_facets() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings()
        .set("payloadMethodPath", "request.method")
        .set("payloadUriPath", "request.path")
        .set("payloadHeadersPath", "request.headers")
        .set("payloadQueryStringPath", "request.query")
        .set("payloadBodyPath", "request.body");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    let facets = RequestFacets::new()
        .method("POST")
        .uri("/orders")
        .header("X-Tenant", "acme")
        .query_param("expand", "items")
        .query_param("expand", "customer")
        .body(r#"{"order": {"id": 42}}"#, "application/json");

    let outcome = filter.execute(&facets).await;
    assert!(outcome.is_success());

    let request = transport.last_request().unwrap();
    assert_eq!(request.function_name, "orders");
    assert_eq!(request.region, "eu-west-1");
    assert_eq!(request.invocation_type, InvocationType::RequestResponse);
    assert_eq!(request.log_type, LogType::None);
    assert_eq!(request.qualifier, None);

    assert_eq!(
        payload_json(&request),
        serde_json::json!({
            "request": {
                "method": "POST",
                "path": "/orders",
                "headers": {"X-Tenant": "acme"},
                "query": {"expand": ["items", "customer"]},
                "body": {"order": {"id": 42}}
            }
        })
    );
}

#[tokio::test]
async fn test_invocation_settings_reach_the_transport() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings()
        .set("invocationType", "Event")
        .set("logType", "Tail")
        .set("qualifier", "prod");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    filter.execute(&RequestFacets::new()).await;

    let request = transport.last_request().unwrap();
    assert_eq!(request.invocation_type, InvocationType::Event);
    assert_eq!(request.log_type, LogType::Tail);
    assert_eq!(request.qualifier.as_deref(), Some("prod"));
    // Nothing mapped, so the payload is the empty object.
    assert_eq!(payload_json(&request), serde_json::json!({}));
}

#[tokio::test]
async fn test_qualifier_template_resolved_per_request() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings().set("qualifier", "${deploy.alias}");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    filter
        .execute(&RequestFacets::new().attribute("deploy.alias", "blue"))
        .await;
    assert_eq!(
        transport.last_request().unwrap().qualifier.as_deref(),
        Some("blue")
    );

    // Without the attribute the qualifier resolves empty and is dropped.
    filter.execute(&RequestFacets::new()).await;
    assert_eq!(transport.last_request().unwrap().qualifier, None);
}

#[tokio::test]
async fn test_missing_region_makes_no_transport_call() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = RawSettings::new().set("functionName", "orders");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;

    assert_eq!(transport.calls(), 0);
    assert_eq!(outcome.attempts(), 0);
    assert_eq!(outcome.error(), Some("region is not configured"));
}

#[tokio::test]
async fn test_retry_until_success() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .fail_with("transient 1")
            .fail_with("transient 2"),
    );
    let filter = InvokeFilter::attach(&base_settings(), transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_report_last_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .fail_with("boom 1")
            .fail_with("boom 2")
            .fail_with("boom 3"),
    );
    let filter = InvokeFilter::attach(&base_settings(), transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;

    assert_eq!(transport.calls(), 3);
    match outcome {
        InvocationOutcome::Failure {
            kind,
            message,
            attempts,
            response,
        } => {
            assert_eq!(kind, FailureKind::Transport);
            assert_eq!(message, "Failure after 3 attempts: boom 3");
            assert_eq!(attempts, 3);
            assert_eq!(response, None);
        }
        InvocationOutcome::Success { .. } => panic!("expected failure"),
    }
}

#[tokio::test]
async fn test_function_error_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::new().respond_with(
        InvokeOutput::ok(r#"{"errorType":"Unhandled"}"#).with_function_error("Unhandled"),
    ));
    let filter = InvokeFilter::attach(&base_settings(), transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;

    // The reply was delivered, so the attempt loop does not run again.
    assert_eq!(transport.calls(), 1);
    assert!(!outcome.is_success());

    let fields = outcome.output_fields(filter.config().memory_size_mb);
    assert_eq!(fields.error.as_deref(), Some("Unhandled"));
    assert_eq!(fields.function_error.as_deref(), Some("Unhandled"));
    assert_eq!(fields.http_status, Some(200));
}

#[tokio::test]
async fn test_http_status_failure_keeps_response_context() {
    let transport = Arc::new(
        ScriptedTransport::new().respond_with(InvokeOutput::ok("denied").with_status(503)),
    );
    let filter = InvokeFilter::attach(&base_settings(), transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.error(), Some("HTTP Error: 503"));

    let fields = outcome.output_fields(filter.config().memory_size_mb);
    assert_eq!(fields.http_status, Some(503));
    assert_eq!(fields.response.as_deref(), Some("denied"));
    assert_eq!(fields.function_error, None);
}

#[tokio::test]
async fn test_explicit_strategy_without_credentials_falls_back_and_attempts() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings().set("credentialType", "explicit");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    // The fallback chain was substituted at attach time.
    assert_eq!(filter.credentials_provider().name(), "default-chain");

    // Invocation still proceeds; credential resolution is fail-lazy.
    let outcome = filter.execute(&RequestFacets::new()).await;
    assert!(outcome.is_success());
    assert!(transport.calls() >= 1);
}

#[tokio::test]
async fn test_profile_file_credentials_end_to_end() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[default]").unwrap();
    writeln!(file, "aws_access_key_id = AKIAFILE").unwrap();
    writeln!(file, "aws_secret_access_key = filesecret").unwrap();

    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings()
        .set("credentialType", "file")
        .set("credentialsFilePath", file.path().to_str().unwrap());
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    assert_eq!(filter.credentials_provider().name(), "profile-file");
    let credentials = filter.credentials_provider().provide().await.unwrap();
    assert_eq!(credentials.access_key(), "AKIAFILE");

    let outcome = filter.execute(&RequestFacets::new()).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_success_write_back_attributes() {
    let transport = Arc::new(ScriptedTransport::new().respond_with(
        InvokeOutput::ok(r#"{"ok":true}"#)
            .with_executed_version("7")
            .with_log_result("U1RBUlQ="),
    ));
    let settings = base_settings().set("memorySize", "256").set("logType", "Tail");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    let outcome = filter.execute(&RequestFacets::new()).await;
    let attributes = outcome
        .output_fields(filter.config().memory_size_mb)
        .to_attributes();

    let value_of = |name: &str| {
        attributes
            .iter()
            .find(|(attr_name, _)| *attr_name == name)
            .map(|(_, value)| value.clone())
    };

    assert_eq!(value_of(attr::RESPONSE).as_deref(), Some(r#"{"ok":true}"#));
    assert_eq!(value_of(attr::HTTP_STATUS_CODE).as_deref(), Some("200"));
    assert_eq!(value_of(attr::EXECUTED_VERSION).as_deref(), Some("7"));
    assert_eq!(value_of(attr::LOG_RESULT).as_deref(), Some("U1RBUlQ="));
    assert_eq!(value_of(attr::MEMORY_SIZE).as_deref(), Some("256"));
    assert_eq!(value_of(attr::ERROR), None);
    assert_eq!(value_of(attr::FUNCTION_ERROR), None);
}

#[tokio::test]
async fn test_seed_body_extended_and_overwritten() {
    let transport = Arc::new(ScriptedTransport::new());
    let settings = base_settings().set("payloadMethodPath", "request.method");
    let filter = InvokeFilter::attach(&settings, transport.clone()).unwrap();

    let facets = RequestFacets::new()
        .seed(r#"{"tenant": "acme", "request": {"method": "SEEDED"}}"#)
        .method("PUT");
    filter.execute(&facets).await;

    assert_eq!(
        payload_json(&transport.last_request().unwrap()),
        serde_json::json!({"tenant": "acme", "request": {"method": "PUT"}})
    );
}
