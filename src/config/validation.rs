//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Refuse default-open allowlists when strict validation is on
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::allowlist::AllowPattern;
use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener.bind_address '{0}'")]
    BindAddress(String),

    #[error("invalid observability.metrics_address '{0}'")]
    MetricsAddress(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("allowlist.patterns[{0}] is empty")]
    EmptyPattern(usize),

    #[error("allowlist.patterns[{index}] '{pattern}' matches every host (security.strict_validation is on)")]
    OpenAllowlist { index: usize, pattern: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for (index, pattern) in config.allowlist.patterns.iter().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(ValidationError::EmptyPattern(index));
        } else if config.security.strict_validation && AllowPattern::new(pattern.as_str()).is_wildcard() {
            errors.push(ValidationError::OpenAllowlist {
                index,
                pattern: pattern.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.timeout_secs = 0;
        config.allowlist.patterns = vec!["api.example.com".into(), "  ".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::ZeroTimeout,
                ValidationError::EmptyPattern(1),
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nope".into())])
        );
    }

    #[test]
    fn test_strict_validation_rejects_open_allowlist() {
        let mut config = ProxyConfig::default();
        // The default allowlist contains "*": accepted unless strict.
        assert!(validate_config(&config).is_ok());

        config.security.strict_validation = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::OpenAllowlist {
                index: 7,
                pattern: "*".into()
            }]
        );

        config.allowlist.patterns = vec!["*.trusted.com".into()];
        assert!(validate_config(&config).is_ok());
    }
}
