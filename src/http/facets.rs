//! Facets of an in-flight request the filter can read.

use bytes::Bytes;
use std::collections::HashMap;

/// The slices of the inbound request exposed to the filter.
///
/// `body` always holds the original upstream body, never an in-flight
/// replacement, so payload assembly cannot echo its own output back into
/// itself. `seed_body` is JSON text an earlier pipeline stage staged as
/// the payload starting point, kept unparsed until assembly.
#[derive(Debug, Clone, Default)]
pub struct RequestFacets {
    /// HTTP verb of the inbound request.
    pub method: Option<String>,
    /// Request path.
    pub uri: Option<String>,
    /// Header names to values, case as received.
    pub headers: HashMap<String, String>,
    /// Query parameters in arrival order; repeated names are preserved.
    pub query: Vec<(String, String)>,
    /// Path parameters resolved by the host's router.
    pub path_params: HashMap<String, String>,
    /// Original upstream body bytes.
    pub body: Option<Bytes>,
    /// Content type declared for the original body.
    pub content_type: Option<String>,
    /// JSON text staged as the payload seed.
    pub seed_body: Option<String>,
    /// Whiteboard attributes used for template resolution.
    pub attributes: HashMap<String, String>,
}

impl RequestFacets {
    /// Create empty facets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP verb.
    pub fn method(mut self, verb: impl Into<String>) -> Self {
        self.method = Some(verb.into());
        self
    }

    /// Set the request path.
    pub fn uri(mut self, path: impl Into<String>) -> Self {
        self.uri = Some(path.into());
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append a query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a path parameter.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Set the body together with its declared content type.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the body without a content type.
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Stage seed JSON text for payload assembly.
    pub fn seed(mut self, json_text: impl Into<String>) -> Self {
        self.seed_body = Some(json_text.into());
        self
    }

    /// Add a whiteboard attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get the body decoded as text, if present.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Whether the declared content type is exactly `application/json`.
    pub fn is_json_body(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }
}
