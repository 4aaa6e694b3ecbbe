//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the downstream status and body verbatim
//! - Strip headers that belong to the downstream transport leg
//! - Default the content type to JSON
//! - Render request errors as `{"error": "<message>"}`
//!
//! # Design Decisions
//! - Bodies are buffered; large-body streaming is out of scope
//! - `content-encoding` is dropped because the client already decoded the body

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::proxy::error::ProxyError;
use crate::proxy::request::ProxyVariant;

/// Response headers never relayed to the caller.
pub const HOP_BY_HOP_RESPONSE_HEADERS: &[&str] =
    &["content-encoding", "content-length", "transfer-encoding", "connection"];

/// Content type used when the downstream does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Outcome of one proxied request.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    /// Build a relayed response from downstream parts.
    pub fn relay(status: StatusCode, downstream_headers: &HeaderMap, body: Bytes) -> Self {
        let mut headers = filter_response_headers(downstream_headers);
        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }
        Self { status, headers, body }
    }

    /// Build a JSON error response.
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status,
            headers,
            body: Bytes::from(body),
        }
    }

    /// Render a request error as seen by the given entry point.
    pub fn from_error(err: &ProxyError, variant: ProxyVariant) -> Self {
        Self::error(err.status(), &err.message(variant))
    }

    /// Content type of the body.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Drop transport-leg headers from a downstream response.
pub fn filter_response_headers(downstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(downstream.len());
    for (name, value) in downstream {
        if !HOP_BY_HOP_RESPONSE_HEADERS.contains(&name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
