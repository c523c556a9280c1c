//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variables / --key (private keys)
//!     → credential.rs (key loading, signing)
//! Ledger endpoint
//!     → client.rs (account queries and broadcasts, with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables or an explicit argument
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod credential;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub use client::{Ledger, LedgerClient};
pub use credential::{
    Credential, CredentialError, CredentialResolver, EnvCredentialResolver, StaticCredentials,
};
pub use types::{AccountInfo, BroadcastAck, LedgerConfig, LedgerError, LedgerResult};
