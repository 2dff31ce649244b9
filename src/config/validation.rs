//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses, URLs and fee amounts parse
//! - Validate value ranges (intervals > 0, multiplier ≥ 100%)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckinConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::fmt;

use crate::blockchain::units::gwei_to_wei;
use crate::config::schema::CheckinConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &CheckinConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.blockchain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("invalid URL '{}': {}", config.blockchain.rpc_url, e),
        ));
    }
    for failover in &config.blockchain.failover_urls {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                "blockchain.failover_urls",
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.blockchain.receipt_poll_ms == 0 {
        errors.push(ValidationError::new("blockchain.receipt_poll_ms", "must be greater than 0"));
    }

    if let Err(e) = config.contract.address.parse::<Address>() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("invalid address '{}': {}", config.contract.address, e),
        ));
    }
    if let Err(e) = config.contract.referrer.parse::<Address>() {
        errors.push(ValidationError::new(
            "contract.referrer",
            format!("invalid address '{}': {}", config.contract.referrer, e),
        ));
    }

    let priority = match gwei_to_wei(&config.fees.priority_gwei) {
        Ok(0) => {
            errors.push(ValidationError::new("fees.priority_gwei", "must be greater than 0"));
            None
        }
        Ok(wei) => Some(wei),
        Err(e) => {
            errors.push(ValidationError::new("fees.priority_gwei", e.to_string()));
            None
        }
    };
    match (gwei_to_wei(&config.fees.max_gwei), priority) {
        // A ceiling below the tip could never be included.
        (Ok(max), Some(priority)) if max > 0 && max < priority => errors.push(ValidationError::new(
            "fees.max_gwei",
            format!(
                "{} is below the priority fee {}",
                config.fees.max_gwei, config.fees.priority_gwei
            ),
        )),
        (Ok(_), _) => {}
        (Err(e), _) => errors.push(ValidationError::new("fees.max_gwei", e.to_string())),
    }
    if config.fees.gas_limit_multiplier_bps < 10_000 {
        errors.push(ValidationError::new(
            "fees.gas_limit_multiplier_bps",
            format!("{} is below 10000 (100%)", config.fees.gas_limit_multiplier_bps),
        ));
    }
    if config.fees.fallback_gas_limit == 0 {
        errors.push(ValidationError::new("fees.fallback_gas_limit", "must be greater than 0"));
    }

    if config.schedule.cycle_interval_secs == 0 {
        errors.push(ValidationError::new("schedule.cycle_interval_secs", "must be greater than 0"));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("invalid socket address '{}'", addr),
            ));
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
        assert!(validate_config(&CheckinConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = CheckinConfig::default();
        config.blockchain.rpc_url = "not a url".to_string();
        config.contract.address = "0x1234".to_string();
        config.fees.priority_gwei = "0".to_string();
        config.fees.gas_limit_multiplier_bps = 9_000;
        config.schedule.cycle_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "blockchain.rpc_url",
                "contract.address",
                "fees.priority_gwei",
                "fees.gas_limit_multiplier_bps",
                "schedule.cycle_interval_secs",
            ]
        );
    }

    #[test]
    fn test_zero_max_fee_is_allowed() {
        let mut config = CheckinConfig::default();
        config.fees.max_gwei = "0".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_ceiling_below_priority_rejected() {
        let mut config = CheckinConfig::default();
        config.fees.priority_gwei = "0.01".to_string();
        config.fees.max_gwei = "0.001".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fees.max_gwei");
    }

    #[test]
    fn test_bad_metrics_address() {
        let mut config = CheckinConfig::default();
        config.observability.metrics_address = Some("localhost".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
