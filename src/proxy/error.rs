//! Request-level error taxonomy.
//!
//! Every failure is local to one request and terminates it with a JSON
//! body of the form `{"error": "<message>"}`.

use axum::http::StatusCode;
use thiserror::Error;

use crate::proxy::request::ProxyVariant;

/// Errors that end a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The route captured no destination.
    #[error("No endpoint specified")]
    MissingEndpoint,

    /// The scheme override was neither `http` nor `https`.
    #[error("Invalid scheme: {0}. Only 'http' and 'https' are allowed.")]
    InvalidScheme(String),

    /// The destination host is not allowlisted.
    #[error("Endpoint not allowed: {url}")]
    NotAllowed { url: String },

    /// Connecting to or talking with the destination failed.
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Anything else; indicates a defect rather than a downstream problem.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Status code reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingEndpoint | ProxyError::InvalidScheme(_) => StatusCode::BAD_REQUEST,
            ProxyError::NotAllowed { .. } => StatusCode::FORBIDDEN,
            ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error message as reported by the given entry point.
    pub fn message(&self, variant: ProxyVariant) -> String {
        match (variant, self) {
            (ProxyVariant::Generic, _) | (ProxyVariant::OData, ProxyError::InvalidScheme(_)) => {
                self.to_string()
            }
            (ProxyVariant::OData, ProxyError::MissingEndpoint) => {
                "No OData endpoint specified".to_string()
            }
            (ProxyVariant::OData, ProxyError::NotAllowed { url }) => {
                format!("OData endpoint not allowed: {}", url)
            }
            (ProxyVariant::OData, ProxyError::Transport(e)) => {
                format!("OData request failed: {}", e)
            }
            (ProxyVariant::OData, ProxyError::Internal(detail)) => {
                format!("Unexpected error in OData proxy: {}", detail)
            }
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    /// Builder errors mean the outbound request could not be constructed,
    /// which is a defect on our side; the rest are downstream failures.
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ProxyError::Internal(e.to_string())
        } else {
            ProxyError::Transport(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::MissingEndpoint.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::InvalidScheme("ftp".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::NotAllowed { url: "https://evil.com".into() }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_generic_messages() {
        let v = ProxyVariant::Generic;
        assert_eq!(ProxyError::MissingEndpoint.message(v), "No endpoint specified");
        assert_eq!(
            ProxyError::InvalidScheme("ftp".into()).message(v),
            "Invalid scheme: ftp. Only 'http' and 'https' are allowed."
        );
        assert_eq!(
            ProxyError::NotAllowed { url: "https://evil.com/data".into() }.message(v),
            "Endpoint not allowed: https://evil.com/data"
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).message(v),
            "Internal server error: boom"
        );
    }

    #[test]
    fn test_odata_messages() {
        let v = ProxyVariant::OData;
        assert_eq!(ProxyError::MissingEndpoint.message(v), "No OData endpoint specified");
        assert_eq!(
            ProxyError::NotAllowed { url: "https://evil.com".into() }.message(v),
            "OData endpoint not allowed: https://evil.com"
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).message(v),
            "Unexpected error in OData proxy: boom"
        );
    }
}
