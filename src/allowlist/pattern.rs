//! Glob pattern matching for destination hosts.
//!
//! # Responsibilities
//! - Compile a glob string (`*` = any run of characters) once at startup
//! - Match a hostname against it, anchored at both ends
//!
//! # Design Decisions
//! - Matching is case-insensitive (hostnames are)
//! - Every character other than `*` is a literal; nothing to escape
//! - No regex: the pattern is split into literal pieces and matched in one
//!   left-to-right scan, so matching is linear in the host length

/// A compiled allowlist pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowPattern {
    /// Pattern as configured.
    raw: String,
    /// Lowercased literal pieces between the `*` characters.
    /// A pattern without `*` has exactly one piece.
    pieces: Vec<String>,
}

impl AllowPattern {
    /// Compile a pattern. Compilation cannot fail.
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let pieces = raw.to_lowercase().split('*').map(str::to_string).collect();
        Self { raw, pieces }
    }

    /// The pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if the pattern consists only of `*` characters and therefore
    /// matches every host.
    pub fn is_wildcard(&self) -> bool {
        !self.raw.is_empty() && self.pieces.iter().all(String::is_empty)
    }

    /// Returns true if `host` fully matches this pattern.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_lowercase();

        let (first, rest) = match self.pieces.split_first() {
            Some(split) => split,
            None => return host.is_empty(),
        };

        // No `*` at all: exact comparison.
        let Some((last, middle)) = rest.split_last() else {
            return host == *first;
        };

        if host.len() < first.len() + last.len()
            || !host.starts_with(first.as_str())
            || !host.ends_with(last.as_str())
        {
            return false;
        }

        // Leftmost placement of each middle piece is always safe for `*` globs.
        let mut remaining = &host[first.len()..host.len() - last.len()];
        for piece in middle {
            match remaining.find(piece.as_str()) {
                Some(idx) => remaining = &remaining[idx + piece.len()..],
                None => return false,
            }
        }
        true
    }
}

impl std::fmt::Display for AllowPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
