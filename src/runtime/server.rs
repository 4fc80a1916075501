//! HTTP front that runs the invocation filter for each inbound request.

use crate::error::FailureKind;
use crate::filter::InvokeFilter;
use crate::http::RequestFacets;
use crate::invoke::InvocationOutcome;
use crate::runtime::GatewayConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Gateway server fronting one invocation filter.
///
/// The first path segment of each request is exposed to the filter as
/// the `gateway.function` attribute, so a function-name template like
/// `${gateway.function}` routes by path; a literal function name ignores
/// it.
pub struct GatewayServer {
    config: GatewayConfig,
    filter: Arc<InvokeFilter>,
}

impl GatewayServer {
    /// Create a server for a configured filter.
    pub fn new(config: GatewayConfig, filter: InvokeFilter) -> Self {
        Self {
            config,
            filter: Arc::new(filter),
        }
    }

    /// The filter behind this server.
    pub fn filter(&self) -> Arc<InvokeFilter> {
        self.filter.clone()
    }

    /// Start the HTTP server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Gateway listening on {}", addr);

        let filter = self.filter.clone();
        let config = self.config.clone();

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let filter = filter.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let filter = filter.clone();
                    let config = config.clone();
                    async move { handle_request(req, filter, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    filter: Arc<InvokeFilter>,
    config: GatewayConfig,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    // System endpoint
    if config.enable_health && path == "/_health" {
        return Ok(text_response(StatusCode::OK, "OK"));
    }

    // Convert the hyper request into filter facets
    let facets = match convert_request(req, &config).await {
        Ok(facets) => facets,
        Err(err) => {
            warn!("Failed to convert request: {} [{}]", err, request_id);
            return Ok(text_response(StatusCode::BAD_REQUEST, err.to_string()));
        }
    };

    let outcome = filter.execute(&facets).await;
    Ok(render_outcome(outcome, &request_id))
}

/// Convert a hyper request into request facets.
async fn convert_request(
    req: Request<Incoming>,
    config: &GatewayConfig,
) -> Result<RequestFacets, Box<dyn std::error::Error + Send + Sync>> {
    let (parts, body) = req.into_parts();
    let body_bytes = body.collect().await?.to_bytes();
    if body_bytes.len() > config.max_body_size {
        return Err("Request body too large".into());
    }
    Ok(facets_from_parts(&parts, body_bytes))
}

/// Build filter facets from request parts and the collected body.
fn facets_from_parts(parts: &hyper::http::request::Parts, body: Bytes) -> RequestFacets {
    let path = parts.uri.path().to_string();
    let mut facets = RequestFacets::new()
        .method(parts.method.as_str())
        .uri(path.as_str())
        .attribute("http.request.verb", parts.method.as_str())
        .attribute("http.request.path", path.as_str());

    // First path segment doubles as the routing attribute.
    let function = path.trim_start_matches('/').split('/').next().unwrap_or("");
    facets = facets.attribute("gateway.function", function);

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            facets = facets.header(name.as_str(), value);
        }
    }

    // Query values pass through undecoded; the function sees the raw text.
    if let Some(query) = parts.uri.query() {
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            match pair.split_once('=') {
                Some((name, value)) => facets = facets.query_param(name, value),
                None => facets = facets.query_param(pair, ""),
            }
        }
    }

    if !body.is_empty() {
        let content_type = parts
            .headers
            .get(hyper::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        facets = facets.body(body, content_type);
    }

    facets
}

/// Render the invocation outcome as an HTTP response.
fn render_outcome(outcome: InvocationOutcome, request_id: &str) -> Response<Full<Bytes>> {
    match outcome {
        InvocationOutcome::Success { response, attempts } => {
            debug!(
                "Invocation succeeded after {} attempt(s) [{}]",
                attempts, request_id
            );
            let status = StatusCode::from_u16(response.http_status).unwrap_or_else(|_| {
                warn!(
                    "Invalid status code {}, falling back to 200 OK",
                    response.http_status
                );
                StatusCode::OK
            });
            json_response(status, Bytes::from(response.response))
        }
        InvocationOutcome::Failure {
            kind,
            message,
            attempts,
            ..
        } => {
            error!(
                "Invocation failed ({}): {} [{}]",
                kind, message, request_id
            );
            let status = match kind {
                FailureKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            let body = serde_json::json!({
                "error": message,
                "kind": kind.to_string(),
                "attempts": attempts,
            });
            json_response(status, Bytes::from(body.to_string()))
        }
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(body))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "text/plain")
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
