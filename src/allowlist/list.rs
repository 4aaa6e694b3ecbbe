//! Compiled allowlist and destination host extraction.
//!
//! # Responsibilities
//! - Hold the compiled pattern list
//! - Decide whether a host (or the host of a URL) may be contacted
//!
//! # Design Decisions
//! - Immutable after construction; shared via `Arc` without locks
//! - Logical OR over patterns; an empty list allows nothing
//! - A bare `*` pattern opens the list to every host. This is reported by
//!   `is_open()` so startup can warn about it, but it is honoured.

use url::quirks::domain_to_unicode;
use url::Url;

use crate::allowlist::pattern::AllowPattern;

/// Ordered list of destination host patterns.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<AllowPattern>,
}

impl AllowList {
    /// Compile the configured patterns.
    pub fn compile<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(AllowPattern::new).collect(),
        }
    }

    /// Compiled patterns, in configuration order.
    pub fn patterns(&self) -> &[AllowPattern] {
        &self.patterns
    }

    /// True if some pattern matches every host.
    pub fn is_open(&self) -> bool {
        self.patterns.iter().any(AllowPattern::is_wildcard)
    }

    /// Returns true if `host` fully matches any pattern.
    pub fn is_allowed(&self, host: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(host))
    }

    /// Returns true if the host of `url` is allowed.
    ///
    /// Internationalised hosts are tried in both their ASCII (punycode) and
    /// Unicode forms, so either spelling may appear in the patterns.
    pub fn is_allowed_url(&self, url: &str) -> bool {
        let host = extract_host(url);
        if self.is_allowed(&host) {
            return true;
        }
        let unicode = domain_to_unicode(&host);
        !unicode.is_empty() && unicode != host && self.is_allowed(&unicode)
    }
}

/// Extract the host a URL points at, without port.
///
/// Uses the parsed URL host when the URL is valid. Otherwise the authority is
/// cut out by hand: the text after `://` (or from the start, when there is no
/// scheme) up to the first `/`, `?` or `#`, minus userinfo and port.
pub fn extract_host(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            return host.to_string();
        }
    }

    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority.rsplit('@').next().unwrap_or(authority);

    let host = match authority.find(']') {
        Some(end) if authority.starts_with('[') => &authority[..=end],
        _ => authority.split(':').next().unwrap_or(authority),
    };
    host.to_lowercase()
}
