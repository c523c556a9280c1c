//! Signing credentials and their resolution.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables or an explicit
//!   command-line argument
//! - Keys are never logged or serialized

use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};
use thiserror::Error;

/// Errors raised while resolving or using a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credential for '{source_name}': environment variable {var} not set")]
    Missing { source_name: String, var: String },

    #[error("no credential registered for '{0}'")]
    Unknown(String),

    #[error("invalid private key format: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// A secp256k1 signing key for one account.
#[derive(Clone)]
pub struct Credential {
    signer: PrivateKeySigner,
}

impl Credential {
    /// Create a credential from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, CredentialError> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| CredentialError::InvalidKey(format!("{}", e)))?;

        Ok(Self { signer })
    }

    /// Address controlled by this credential.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature, CredentialError> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Looks up the credential for a source account reference.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, source: &str) -> Result<Credential, CredentialError>;
}

/// Resolves `alice` to the key in `<prefix>ALICE`.
#[derive(Debug, Clone)]
pub struct EnvCredentialResolver {
    prefix: String,
}

impl EnvCredentialResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable consulted for `source`.
    pub fn var_name(&self, source: &str) -> String {
        let suffix: String = source
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl CredentialResolver for EnvCredentialResolver {
    fn resolve(&self, source: &str) -> Result<Credential, CredentialError> {
        let var = self.var_name(source);
        let key = std::env::var(&var).map_err(|_| CredentialError::Missing {
            source_name: source.to_string(),
            var: var.clone(),
        })?;
        let credential = Credential::from_private_key(&key)?;
        tracing::debug!(source, address = %credential.address(), "Credential resolved");
        Ok(credential)
    }
}

/// Fixed name → credential table.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<String, Credential>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, credential: Credential) -> Self {
        self.keys.insert(source.into(), credential);
        self
    }
}

impl CredentialResolver for StaticCredentials {
    fn resolve(&self, source: &str) -> Result<Credential, CredentialError> {
        self.keys
            .get(source)
            .cloned()
            .ok_or_else(|| CredentialError::Unknown(source.to_string()))
    }
}
