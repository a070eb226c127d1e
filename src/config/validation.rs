//! Configuration validation.
//!
//! Serde handles syntactic validation; this module does the semantic
//! checks (parseable addresses, sane ranges, backend-specific required
//! fields). All errors are collected and returned together, not just the
//! first one found.

use std::fmt;

use crate::config::schema::{GatewayConfig, StoreBackend};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "not a valid socket address",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new(
            "security.max_body_size",
            "must be greater than zero",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a valid socket address",
        ));
    }

    if config.policy.coverage_rate_bps > 10_000 {
        errors.push(ValidationError::new(
            "policy.coverage_rate_bps",
            "coverage rate cannot exceed 10000 (100%)",
        ));
    }

    if config.extraction.enabled && config.extraction.api_base.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "extraction.api_base",
            "not a valid URL",
        ));
    }

    if config.blockchain.enabled {
        if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
        }
        if config
            .blockchain
            .contract_address
            .parse::<alloy::primitives::Address>()
            .is_err()
        {
            errors.push(ValidationError::new(
                "blockchain.contract_address",
                "not a valid contract address",
            ));
        }
        if config.blockchain.rpc_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "blockchain.rpc_timeout_secs",
                "must be greater than zero",
            ));
        }
        if config.blockchain.gas_price_multiplier < 1.0 {
            errors.push(ValidationError::new(
                "blockchain.gas_price_multiplier",
                "must be at least 1.0",
            ));
        }
    }

    if config.store.backend == StoreBackend::Remote && config.store.url.parse::<url::Url>().is_err()
    {
        errors.push(ValidationError::new(
            "store.url",
            "remote store requires a valid base URL",
        ));
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
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.policy.coverage_rate_bps = 20_000;
        config.blockchain.enabled = true;
        config.blockchain.contract_address = "0xnope".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"policy.coverage_rate_bps"));
        assert!(fields.contains(&"blockchain.contract_address"));
    }

    #[test]
    fn test_remote_store_requires_url() {
        let mut config = GatewayConfig::default();
        config.store.backend = StoreBackend::Remote;
        config.store.url = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "store.url");
    }
}
