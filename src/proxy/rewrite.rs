//! Outbound request preparation.
//!
//! # Responsibilities
//! - Merge inbound query parameters into the target URL
//! - Strip hop-by-hop headers
//! - Force OData headers for the OData entry point
//! - Decide whether the inbound body travels downstream
//!
//! # Design Decisions
//! - Credentials (authorization, cookies) pass through untouched
//! - Repeated query keys are all forwarded, in arrival order
//! - Query values are re-encoded with form encoding (`+` for spaces)

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};

use crate::proxy::request::{ProxyRequest, ProxyVariant};
use crate::proxy::target::{TargetUrl, SCHEME_OVERRIDE_PARAM};

/// Request headers never forwarded by either entry point.
pub const HOP_BY_HOP_REQUEST_HEADERS: &[&str] =
    &["host", "connection", "content-length", "transfer-encoding"];

/// Inbound headers dropped by the OData entry point so the forced values stand.
pub const ODATA_REPLACED_HEADERS: &[&str] = &["accept", "content-type"];

pub const ODATA_ACCEPT: &str = "application/json;odata.metadata=minimal";
pub const ODATA_CONTENT_TYPE: &str = "application/json";
pub const ODATA_VERSION: &str = "4.0";

static ODATA_VERSION_HEADER: HeaderName = HeaderName::from_static("odata-version");

/// A request ready to be sent downstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Build the outbound request for `target` from an inbound request.
pub fn rewrite(target: &TargetUrl, request: ProxyRequest, variant: ProxyVariant) -> OutboundRequest {
    let url = merge_query(target.as_str(), &request.query);
    let headers = filter_request_headers(&request.headers, variant);
    let body = if variant.carries_body(&request.method) {
        request.body
    } else {
        None
    };

    OutboundRequest {
        method: request.method,
        url,
        headers,
        body,
    }
}

/// Append `params` to `url`, skipping the scheme override.
pub fn merge_query(url: &str, params: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(k, _)| k != SCHEME_OVERRIDE_PARAM) {
        serializer.append_pair(key, value);
        any = true;
    }
    if !any {
        return url.to_string();
    }

    let delimiter = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, delimiter, serializer.finish())
}

/// Filter inbound headers for forwarding.
pub fn filter_request_headers(inbound: &HeaderMap, variant: ProxyVariant) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 3);

    if variant == ProxyVariant::OData {
        headers.insert(header::ACCEPT, HeaderValue::from_static(ODATA_ACCEPT));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ODATA_CONTENT_TYPE));
        headers.insert(ODATA_VERSION_HEADER.clone(), HeaderValue::from_static(ODATA_VERSION));
    }

    for name in inbound.keys() {
        if is_dropped(name, variant) {
            continue;
        }
        // Inbound values replace defaults (e.g. a caller's own OData-Version).
        headers.remove(name);
        for value in inbound.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

fn is_dropped(name: &HeaderName, variant: ProxyVariant) -> bool {
    let name = name.as_str();
    HOP_BY_HOP_REQUEST_HEADERS.contains(&name)
        || (variant == ProxyVariant::OData && ODATA_REPLACED_HEADERS.contains(&name))
}
