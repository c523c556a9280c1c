//! Sequence bootstrap and the local sequence cursor.
//!
//! The ledger is asked once per batch for the account's number and sequence.
//! From then on sequences are handed out locally by a [`SequenceCursor`] that
//! only the owning pipeline can advance.

use alloy::primitives::Address;

use crate::batch::error::PipelineError;
use crate::ledger::Ledger;
use crate::tx::Coins;

/// Exclusive, monotonically advancing sequence counter for one account.
///
/// Deliberately neither `Clone` nor `Copy`: advancing requires `&mut`.
#[derive(Debug, PartialEq, Eq)]
pub struct SequenceCursor {
    next: u64,
}

impl SequenceCursor {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Sequence the next signed transaction will carry.
    pub fn current(&self) -> u64 {
        self.next
    }

    /// Move past the current sequence, returning the new current value.
    ///
    /// Signing checks the whole [`BroadcastWindow`](crate::batch::BroadcastWindow)
    /// up front, so the cursor never passes `u64::MAX`.
    pub fn advance(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// An account resolved against the ledger for one pipeline run.
#[derive(Debug)]
pub struct AccountIdentity {
    address: Address,
    account_number: u64,
    start_sequence: u64,
    balance: Coins,
    cursor: SequenceCursor,
}

impl AccountIdentity {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn account_number(&self) -> u64 {
        self.account_number
    }

    /// Sequence reported by the ledger at bootstrap.
    pub fn start_sequence(&self) -> u64 {
        self.start_sequence
    }

    /// Coins held at bootstrap.
    pub fn balance(&self) -> &Coins {
        &self.balance
    }

    pub fn cursor(&self) -> &SequenceCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut SequenceCursor {
        &mut self.cursor
    }
}

/// Resolves an account's number and starting sequence.
pub struct SequenceAllocator<'a> {
    ledger: &'a dyn Ledger,
}

impl<'a> SequenceAllocator<'a> {
    pub fn new(ledger: &'a dyn Ledger) -> Self {
        Self { ledger }
    }

    /// Confirm the account exists and bootstrap its sequence cursor.
    ///
    /// Performs exactly one ledger query.
    pub async fn bootstrap(&self, address: Address) -> Result<AccountIdentity, PipelineError> {
        let info = self
            .ledger
            .account(address)
            .await
            .map_err(PipelineError::Bootstrap)?
            .ok_or(PipelineError::AccountNotFound(address))?;

        tracing::debug!(
            address = %address,
            account_number = info.account_number,
            sequence = info.sequence,
            "Account bootstrapped"
        );

        Ok(AccountIdentity {
            address,
            account_number: info.account_number,
            start_sequence: info.sequence,
            balance: info.coins,
            cursor: SequenceCursor::new(info.sequence),
        })
    }
}
