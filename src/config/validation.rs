//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Every failure is collected so
//! an operator sees the whole list at once.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("mcp.server_name must not be empty")]
    EmptyServerName,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Some(address) = &config.upstream.address {
        check_address(&mut errors, "upstream.address", address);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }
    if config.mcp.session_idle_secs == 0 {
        errors.push(ValidationError::Zero("mcp.session_idle_secs"));
    }
    if config.mcp.max_sessions == 0 {
        errors.push(ValidationError::Zero("mcp.max_sessions"));
    }
    if config.mcp.server_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServerName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_upstream_address() {
        let mut config = GatewayConfig::default();
        config.upstream.address = Some("localhost".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidAddress {
                field: "upstream.address",
                value: "localhost".into(),
            }]
        );
    }

    #[test]
    fn test_zero_session_bounds_rejected() {
        let mut config = GatewayConfig::default();
        config.mcp.session_idle_secs = 0;
        config.mcp.max_sessions = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Zero("mcp.session_idle_secs"),
                ValidationError::Zero("mcp.max_sessions"),
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
