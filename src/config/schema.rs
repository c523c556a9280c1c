//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the batch sender.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the batch sender.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BatchConfig {
    /// Ledger endpoint settings.
    pub ledger: LedgerConfig,

    /// Broadcast pacing settings.
    pub pacing: PacingConfig,

    /// Fee and memo attached to every transaction.
    pub fee: FeeConfig,

    /// Credential lookup settings.
    pub keys: KeysConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the ledger REST endpoint.
    pub rpc_url: String,

    /// Chain identifier included in every sign document.
    pub chain_id: String,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:1317".to_string(),
            chain_id: "test-chain".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Broadcast pacing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause taken after each reconciliation check, in milliseconds.
    pub interval_ms: u64,

    /// Broadcasts between reconciliation checks when the command line gives none.
    pub default_step: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10,
            default_step: 10,
        }
    }
}

/// Fee configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Fee coins, e.g. "5stake". Empty means no fee.
    pub amount: String,

    /// Gas limit per transaction.
    pub gas: u64,

    /// Memo attached to every transaction.
    pub memo: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            amount: String::new(),
            gas: 200_000,
            memo: String::new(),
        }
    }
}

/// Credential lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Prefix of the environment variables holding signing keys.
    /// The source name is upper-cased and appended.
    pub env_prefix: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            env_prefix: "BATCH_SEND_KEY_".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
