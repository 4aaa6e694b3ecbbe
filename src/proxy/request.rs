//! Inbound request model.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// Which entry point a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyVariant {
    /// `/proxy/{endpoint}`: plain pass-through.
    Generic,
    /// `/odata/{endpoint}`: pass-through with OData headers forced.
    OData,
}

impl ProxyVariant {
    /// Short name used for logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyVariant::Generic => "proxy",
            ProxyVariant::OData => "odata",
        }
    }

    /// Whether a request body is forwarded for `method`.
    pub fn carries_body(&self, method: &Method) -> bool {
        match self {
            ProxyVariant::Generic => {
                method == Method::POST || method == Method::PUT || method == Method::PATCH
            }
            ProxyVariant::OData => method == Method::POST,
        }
    }
}

impl std::fmt::Display for ProxyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured inbound request. Read-only once built.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Path segment captured after the route prefix; may already carry a scheme.
    pub endpoint: String,
    pub method: Method,
    /// Header names are case-insensitive by construction.
    pub headers: HeaderMap,
    /// Decoded query pairs in arrival order. Keys are case-sensitive and may repeat.
    pub query: Vec<(String, String)>,
    /// `None` when the method carries no body or the body could not be read.
    pub body: Option<Bytes>,
}

impl ProxyRequest {
    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode a raw query string into ordered pairs.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}
