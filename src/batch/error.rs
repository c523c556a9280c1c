//! Pipeline stages and the errors that end a pipeline.

use std::fmt;

use alloy::primitives::Address;
use thiserror::Error;

use crate::batch::types::BroadcastWindow;
use crate::ledger::{CredentialError, LedgerError};
use crate::tx::{Coins, SigningError};

/// Lifecycle of one account's pipeline.
///
/// ```text
/// Bootstrapping → Signing → Broadcasting → Completed
///       ↓            ↓           ↓
///    Aborted      Aborted     Aborted (drift / reconciliation failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Bootstrapping,
    Signing,
    Broadcasting,
    Completed,
    Aborted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Bootstrapping => "bootstrapping",
            PipelineStage::Signing => "signing",
            PipelineStage::Broadcasting => "broadcasting",
            PipelineStage::Completed => "completed",
            PipelineStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A broadcast the ledger did not accept. Recorded, never fatal to a batch.
#[derive(Debug)]
pub struct BroadcastFailure {
    pub sequence: u64,
    pub error: LedgerError,
}

/// Fatal errors for one account's pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("account {0} not found")]
    AccountNotFound(Address),

    #[error("address {address} doesn't have enough coins: has '{available}', needs '{required}'")]
    InsufficientFunds {
        address: Address,
        required: Coins,
        available: Coins,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("account lookup failed: {0}")]
    Bootstrap(#[source] LedgerError),

    #[error("a batch of {count} starting at sequence {start} overflows the sequence range")]
    SequenceOverflow { start: u64, count: u64 },

    #[error("signing sequence {sequence} failed: {source}")]
    Signing {
        sequence: u64,
        #[source]
        source: SigningError,
    },

    #[error("sequence drift: expected remote sequence in {window} before sending {next}, observed {observed}")]
    SequenceDrift {
        window: BroadcastWindow,
        next: u64,
        observed: u64,
    },

    #[error("sequence reconciliation after {sent} broadcasts failed: {source}")]
    Reconcile {
        sent: u64,
        #[source]
        source: LedgerError,
    },

    #[error("broadcast of sequence {sequence} failed: {source}")]
    Broadcast {
        sequence: u64,
        #[source]
        source: LedgerError,
    },

    #[error("pipeline task failed: {0}")]
    Panicked(String),
}

impl PipelineError {
    /// Stage the pipeline was in when this error ended it.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::AccountNotFound(_)
            | PipelineError::InsufficientFunds { .. }
            | PipelineError::Credential(_)
            | PipelineError::Bootstrap(_)
            | PipelineError::SequenceOverflow { .. } => Some(PipelineStage::Bootstrapping),
            PipelineError::Signing { .. } => Some(PipelineStage::Signing),
            PipelineError::SequenceDrift { .. }
            | PipelineError::Reconcile { .. }
            | PipelineError::Broadcast { .. } => Some(PipelineStage::Broadcasting),
            PipelineError::Panicked(_) => None,
        }
    }
}
