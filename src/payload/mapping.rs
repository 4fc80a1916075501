//! Facet-to-path mapping configuration for payload assembly.

/// One semantic slice of the inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// HTTP verb.
    Method,
    /// Header map.
    Headers,
    /// Original request body.
    Body,
    /// Request path.
    Uri,
    /// Query parameters.
    QueryString,
    /// Router path parameters.
    PathParams,
}

impl Facet {
    /// Every facet, in assembly order.
    pub const ALL: [Facet; 6] = [
        Facet::Method,
        Facet::Headers,
        Facet::Body,
        Facet::Uri,
        Facet::QueryString,
        Facet::PathParams,
    ];

    /// Logical facet name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Method => "method",
            Facet::Headers => "headers",
            Facet::Body => "body",
            Facet::Uri => "uri",
            Facet::QueryString => "querystring",
            Facet::PathParams => "path-params",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where each facet lands in the outbound payload.
///
/// Paths are dotted (`"request.headers"`) and may share intermediate
/// objects. A facet whose path is unset or blank is left out of the
/// payload entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    method: Option<String>,
    headers: Option<String>,
    body: Option<String>,
    uri: Option<String>,
    query_string: Option<String>,
    path_params: Option<String>,
}

impl FieldMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output path for the method facet.
    pub fn method(mut self, path: impl Into<String>) -> Self {
        self.method = normalized(path);
        self
    }

    /// Set the output path for the headers facet.
    pub fn headers(mut self, path: impl Into<String>) -> Self {
        self.headers = normalized(path);
        self
    }

    /// Set the output path for the body facet.
    pub fn body(mut self, path: impl Into<String>) -> Self {
        self.body = normalized(path);
        self
    }

    /// Set the output path for the uri facet.
    pub fn uri(mut self, path: impl Into<String>) -> Self {
        self.uri = normalized(path);
        self
    }

    /// Set the output path for the querystring facet.
    pub fn query_string(mut self, path: impl Into<String>) -> Self {
        self.query_string = normalized(path);
        self
    }

    /// Set the output path for the path-params facet.
    pub fn path_params(mut self, path: impl Into<String>) -> Self {
        self.path_params = normalized(path);
        self
    }

    /// The configured output path for a facet, if any.
    pub fn path_for(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Method => self.method.as_deref(),
            Facet::Headers => self.headers.as_deref(),
            Facet::Body => self.body.as_deref(),
            Facet::Uri => self.uri.as_deref(),
            Facet::QueryString => self.query_string.as_deref(),
            Facet::PathParams => self.path_params.as_deref(),
        }
    }

    /// Whether no facet has a configured path.
    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|facet| self.path_for(*facet).is_none())
    }
}

fn normalized(path: impl Into<String>) -> Option<String> {
    let path = path.into();
    let trimmed = path.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
