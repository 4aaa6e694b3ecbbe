//! Downstream forwarding.
//!
//! # Responsibilities
//! - Run the per-request pipeline: resolve → allowlist → rewrite → send
//! - Issue the outbound call with a bounded timeout
//! - Map the downstream response or failure into a `ProxyResponse`
//!
//! # Design Decisions
//! - No retries: a failed call is reported to the caller immediately
//! - TLS certificates are verified for `https` targets only
//! - Idle connections are not kept between requests
//! - Redirects are followed only while the next hop is allowlisted;
//!   otherwise the redirect itself is relayed
//! - The unverified client never follows a redirect onto `https`

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

use crate::allowlist::AllowList;
use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;
use crate::proxy::request::{ProxyRequest, ProxyVariant};
use crate::proxy::response::ProxyResponse;
use crate::proxy::rewrite::{rewrite, OutboundRequest};
use crate::proxy::target::{resolve, Scheme, SCHEME_OVERRIDE_PARAM};

/// Forwards approved requests to their destination.
#[derive(Clone)]
pub struct Forwarder {
    allowlist: Arc<AllowList>,
    /// Client for `https` targets (certificates verified).
    verifying: Client,
    /// Client for `http` targets.
    plain: Client,
}

impl Forwarder {
    /// Build the forwarder and its downstream clients.
    pub fn new(allowlist: Arc<AllowList>, config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let verifying = build_client(&allowlist, config, true)?;
        let plain = build_client(&allowlist, config, false)?;
        Ok(Self {
            allowlist,
            verifying,
            plain,
        })
    }

    pub fn allowlist(&self) -> &AllowList {
        &self.allowlist
    }

    /// Handle one inbound request end to end. Always yields a response.
    pub async fn forward(&self, variant: ProxyVariant, request: ProxyRequest) -> ProxyResponse {
        match self.try_forward(variant, request).await {
            Ok(response) => response,
            Err(e) => {
                let message = e.message(variant);
                tracing::error!(route = %variant, status = e.status().as_u16(), error = %message, "Proxy request failed");
                ProxyResponse::from_error(&e, variant)
            }
        }
    }

    async fn try_forward(
        &self,
        variant: ProxyVariant,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ProxyError> {
        let target = resolve(&request.endpoint, request.query_param(SCHEME_OVERRIDE_PARAM))?;

        if !self.allowlist.is_allowed_url(target.as_str()) {
            return Err(ProxyError::NotAllowed {
                url: target.to_string(),
            });
        }

        let outbound = rewrite(&target, request, variant);

        tracing::info!(
            route = %variant,
            method = %outbound.method,
            target = %outbound.url,
            "Proxying request"
        );

        self.execute(outbound).await
    }

    /// Send a prepared request and relay what comes back.
    pub async fn execute(&self, outbound: OutboundRequest) -> Result<ProxyResponse, ProxyError> {
        let client = if verifies_certificates(&outbound.url) {
            &self.verifying
        } else {
            &self.plain
        };

        let mut builder = client
            .request(outbound.method, &outbound.url)
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Downstream responded");

        Ok(ProxyResponse::relay(status, &headers, body))
    }
}

/// Certificates are checked for every target except plain `http`.
fn verifies_certificates(url: &str) -> bool {
    Scheme::of_url(url) != Some(Scheme::Http)
}

fn build_client(
    allowlist: &Arc<AllowList>,
    config: &UpstreamConfig,
    verify_certificates: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(0)
        .redirect(redirect_policy(
            allowlist.clone(),
            config.max_redirects,
            verify_certificates,
        ))
        .danger_accept_invalid_certs(!verify_certificates)
        .build()
}

fn redirect_policy(
    allowlist: Arc<AllowList>,
    max_redirects: usize,
    verify_certificates: bool,
) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            attempt.error(format!("too many redirects (max {})", max_redirects))
        } else if !verify_certificates && verifies_certificates(attempt.url().as_str()) {
            tracing::warn!(location = %attempt.url(), "Redirect from http to https; relaying redirect");
            attempt.stop()
        } else if allowlist.is_allowed_url(attempt.url().as_str()) {
            attempt.follow()
        } else {
            tracing::warn!(location = %attempt.url(), "Redirect target not allowed; relaying redirect");
            attempt.stop()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode};

    fn forwarder(patterns: &[&str]) -> Forwarder {
        let allowlist = Arc::new(AllowList::compile(patterns.iter().copied()));
        Forwarder::new(allowlist, &UpstreamConfig::default()).unwrap()
    }

    fn request(endpoint: &str, query: &[(&str, &str)]) -> ProxyRequest {
        ProxyRequest {
            endpoint: endpoint.to_string(),
            method: Method::GET,
            headers: HeaderMap::new(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
        }
    }

    fn error_message(response: &ProxyResponse) -> String {
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_rejects_host_outside_allowlist() {
        let fwd = forwarder(&["*.trusted.com"]);
        let response = fwd.forward(ProxyVariant::Generic, request("evil.com/data", &[])).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(error_message(&response), "Endpoint not allowed: https://evil.com/data");
    }

    #[tokio::test]
    async fn test_rejection_reports_resolved_scheme() {
        let fwd = forwarder(&[]);
        let response = fwd
            .forward(ProxyVariant::OData, request("evil.com", &[("__proxy_scheme", "http")]))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(error_message(&response), "OData endpoint not allowed: http://evil.com");
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let fwd = forwarder(&["*"]);
        let response = fwd.forward(ProxyVariant::Generic, request("", &[])).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&response), "No endpoint specified");

        let response = fwd.forward(ProxyVariant::OData, request("", &[])).await;
        assert_eq!(error_message(&response), "No OData endpoint specified");
    }

    #[tokio::test]
    async fn test_invalid_scheme_is_client_error() {
        let fwd = forwarder(&["*"]);
        let response = fwd
            .forward(ProxyVariant::Generic, request("api.example.com", &[("__proxy_scheme", "ftp")]))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&response),
            "Invalid scheme: ftp. Only 'http' and 'https' are allowed."
        );
    }

    #[test]
    fn test_certificates_verified_only_for_https() {
        assert!(verifies_certificates("https://api.example.com/x"));
        assert!(verifies_certificates("HTTPS://api.example.com/x"));
        assert!(!verifies_certificates("http://api.example.com/x"));
        assert!(!verifies_certificates("HTTP://127.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_unparsable_url_is_internal_error() {
        let fwd = forwarder(&["*"]);
        let outbound = OutboundRequest {
            method: Method::GET,
            url: "http://[not-a-host/".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };
        match fwd.execute(outbound).await {
            Err(e @ ProxyError::Internal(_)) => {
                assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("expected internal error, got {:?}", other.map(|r| r.status)),
        }
    }
}
