//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, step > 0, gas > 0)
//! - Check that URLs, coin strings and socket addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BatchConfig;
use crate::tx::Coins;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `ledger.rpc_url`.
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

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &BatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.ledger.rpc_url) {
        errors.push(ValidationError::new(
            "ledger.rpc_url",
            format!("invalid URL '{}': {}", config.ledger.rpc_url, e),
        ));
    }
    if config.ledger.chain_id.trim().is_empty() {
        errors.push(ValidationError::new("ledger.chain_id", "must not be empty"));
    }
    if config.ledger.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "ledger.rpc_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.pacing.default_step == 0 {
        errors.push(ValidationError::new(
            "pacing.default_step",
            "must be greater than zero",
        ));
    }

    if let Err(e) = config.fee.amount.parse::<Coins>() {
        errors.push(ValidationError::new("fee.amount", e.to_string()));
    }
    if config.fee.gas == 0 {
        errors.push(ValidationError::new("fee.gas", "must be greater than zero"));
    }

    if config.keys.env_prefix.is_empty() {
        errors.push(ValidationError::new("keys.env_prefix", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "invalid socket address '{}'",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
