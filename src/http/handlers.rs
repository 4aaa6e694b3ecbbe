//! Inbound request handlers.
//!
//! # Responsibilities
//! - Capture the endpoint after the route prefix, untouched
//! - Decode the query string into ordered pairs
//! - Read the body for methods that carry one
//! - Hand the captured request to the forwarder and record metrics
//!
//! # Design Decisions
//! - The endpoint is taken from the raw request path so percent-escapes
//!   reach the destination as the caller sent them
//! - An unreadable or oversized body is logged and dropped, never an error

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::request::parse_query;
use crate::proxy::{ProxyRequest, ProxyVariant};

/// `/proxy/{endpoint}`
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, ProxyVariant::Generic, request).await
}

/// `/odata/{endpoint}`
pub async fn odata_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, ProxyVariant::OData, request).await
}

async fn handle(state: AppState, variant: ProxyVariant, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let captured = capture(variant, request, state.max_body_size).await;
    let response = state.forwarder.forward(variant, captured).await;

    metrics::record_request(variant.as_str(), method.as_str(), response.status.as_u16(), start);
    response.into_response()
}

/// Turn an inbound HTTP request into a `ProxyRequest`.
pub async fn capture(variant: ProxyVariant, request: Request<Body>, max_body_size: usize) -> ProxyRequest {
    let (parts, body) = request.into_parts();

    let body = if variant.carries_body(&parts.method) {
        match axum::body::to_bytes(body, max_body_size).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(route = %variant, error = %e, "Could not read request body");
                None
            }
        }
    } else {
        None
    };

    ProxyRequest {
        endpoint: endpoint_from_path(parts.uri.path(), variant),
        query: parse_query(parts.uri.query()),
        method: parts.method,
        headers: parts.headers,
        body,
    }
}

/// Route prefix of an entry point.
pub fn route_prefix(variant: ProxyVariant) -> &'static str {
    match variant {
        ProxyVariant::Generic => "/proxy",
        ProxyVariant::OData => "/odata",
    }
}

/// Everything after `/proxy/` (or `/odata/`); empty when nothing was captured.
fn endpoint_from_path(path: &str, variant: ProxyVariant) -> String {
    path.strip_prefix(route_prefix(variant))
        .map(|rest| rest.strip_prefix('/').unwrap_or(rest))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_endpoint_from_path() {
        assert_eq!(
            endpoint_from_path("/proxy/api.example.com/v1/items", ProxyVariant::Generic),
            "api.example.com/v1/items"
        );
        assert_eq!(
            endpoint_from_path("/proxy/https://api.example.com/a%20b", ProxyVariant::Generic),
            "https://api.example.com/a%20b"
        );
        assert_eq!(
            endpoint_from_path("/odata/services.odata.org/V4/", ProxyVariant::OData),
            "services.odata.org/V4/"
        );
        assert_eq!(endpoint_from_path("/proxy/", ProxyVariant::Generic), "");
        assert_eq!(endpoint_from_path("/proxy", ProxyVariant::Generic), "");
    }

    #[tokio::test]
    async fn test_capture_reads_body_for_payload_methods() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/proxy/api.example.com/items?a=1&__proxy_scheme=http")
            .header("x-custom", "1")
            .body(Body::from("payload"))
            .unwrap();

        let captured = capture(ProxyVariant::Generic, request, 1024).await;
        assert_eq!(captured.endpoint, "api.example.com/items");
        assert_eq!(captured.method, Method::POST);
        assert_eq!(captured.query_param("a"), Some("1"));
        assert_eq!(captured.query_param("__proxy_scheme"), Some("http"));
        assert_eq!(captured.headers.get("x-custom").unwrap(), "1");
        assert_eq!(captured.body.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn test_capture_skips_body_for_other_methods() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/odata/services.odata.org/People")
            .body(Body::from("payload"))
            .unwrap();

        let captured = capture(ProxyVariant::OData, request, 1024).await;
        assert!(captured.body.is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_is_dropped_not_fatal() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/proxy/api.example.com")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();

        let captured = capture(ProxyVariant::Generic, request, 16).await;
        assert_eq!(captured.endpoint, "api.example.com");
        assert!(captured.body.is_none());
    }
}
