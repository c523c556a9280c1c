//! Signing context for one transaction.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{FeeConfig, LedgerConfig};
use crate::tx::coins::{Coins, CoinsError};

/// Fee attached to every transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fee {
    pub amount: Coins,
    pub gas: u64,
}

/// Chain-wide signing parameters, shared read-only by every pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningParams {
    pub chain_id: String,
    pub fee: Fee,
    pub memo: String,
}

impl SigningParams {
    /// Build from the validated ledger and fee config sections.
    pub fn from_config(ledger: &LedgerConfig, fee: &FeeConfig) -> Result<Self, CoinsError> {
        Ok(Self {
            chain_id: ledger.chain_id.clone(),
            fee: Fee {
                amount: fee.amount.parse()?,
                gas: fee.gas,
            },
            memo: fee.memo.clone(),
        })
    }
}

/// Everything needed to build and sign one transaction.
///
/// A context is consumed by [`TxContext::next`], which yields the context for
/// the following sequence number. Two payloads of a batch never share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    params: Arc<SigningParams>,
    account_number: u64,
    sequence: u64,
}

impl TxContext {
    pub fn new(params: Arc<SigningParams>, account_number: u64, sequence: u64) -> Self {
        Self {
            params,
            account_number,
            sequence,
        }
    }

    pub fn params(&self) -> &SigningParams {
        &self.params
    }

    pub fn account_number(&self) -> u64 {
        self.account_number
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consume this context and return the one for the next sequence,
    /// or `None` once the sequence range is exhausted.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Some(Self {
            sequence: self.sequence.checked_add(1)?,
            ..self
        })
    }
}
