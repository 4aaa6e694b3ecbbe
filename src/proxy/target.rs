//! Target resolution.
//!
//! # Responsibilities
//! - Turn the captured endpoint into a fully qualified destination URL
//! - Apply and validate the `__proxy_scheme` override
//!
//! # Design Decisions
//! - A scheme already present in the endpoint wins over the override
//! - An unrecognised override is a client error, never a silent default
//! - Without an override the scheme is `https`

use crate::proxy::error::ProxyError;

/// Query parameter carrying the scheme override. Never forwarded.
pub const SCHEME_OVERRIDE_PARAM: &str = "__proxy_scheme";

/// URL schemes the proxy will speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Parse an override value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("http") {
            Some(Scheme::Http)
        } else if value.eq_ignore_ascii_case("https") {
            Some(Scheme::Https)
        } else {
            None
        }
    }

    /// Scheme the URL starts with, if it is one of ours.
    pub fn of_url(url: &str) -> Option<Self> {
        [Scheme::Https, Scheme::Http]
            .into_iter()
            .find(|s| starts_with_ignore_case(url, s.prefix()))
    }

    fn prefix(&self) -> &'static str {
        match self {
            Scheme::Http => "http://",
            Scheme::Https => "https://",
        }
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// A resolved destination URL. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    url: String,
    scheme: Scheme,
}

impl TargetUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

impl std::fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Resolve `raw_endpoint` into a destination URL.
///
/// An empty override value counts as absent.
pub fn resolve(raw_endpoint: &str, scheme_override: Option<&str>) -> Result<TargetUrl, ProxyError> {
    if raw_endpoint.is_empty() {
        return Err(ProxyError::MissingEndpoint);
    }

    if let Some(scheme) = Scheme::of_url(raw_endpoint) {
        return Ok(TargetUrl {
            url: raw_endpoint.to_string(),
            scheme,
        });
    }

    let scheme = match scheme_override.filter(|s| !s.is_empty()) {
        Some(value) => {
            Scheme::parse(value).ok_or_else(|| ProxyError::InvalidScheme(value.to_string()))?
        }
        None => Scheme::Https,
    };

    Ok(TargetUrl {
        url: format!("{}://{}", scheme.as_str(), raw_endpoint),
        scheme,
    })
}
