//! Configuration validation.
//!
//! Semantic checks on a parsed [`GateConfig`]; serde handles the syntactic
//! ones. All errors are collected and returned together, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::throttling::Rate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address {0:?}")]
    BindAddress(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("throttle rate {scope:?} is invalid: {value:?}")]
    ThrottleRate { scope: String, value: String },

    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (scope, value) in &config.throttle.rates {
        if value.parse::<Rate>().is_err() {
            errors.push(ValidationError::ThrottleRate {
                scope: scope.clone(),
                value: value.clone(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
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
    fn default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GateConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config
            .throttle
            .rates
            .insert("anon".into(), "60/fortnight".into());
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::ThrottleRate {
            scope: "anon".into(),
            value: "60/fortnight".into(),
        }));
    }

    #[test]
    fn metrics_address_is_checked_only_when_enabled() {
        let mut config = GateConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
