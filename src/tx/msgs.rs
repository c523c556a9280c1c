//! Messages carried inside a transaction.

use std::fmt::Debug;

use alloy::primitives::Address;
use serde_json::{json, Value};
use thiserror::Error;

use crate::tx::coins::Coins;

/// Reasons a message fails basic validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MsgError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient coins: {0}")]
    InsufficientCoins(String),
}

/// A ledger message that can be placed in a signed transaction.
pub trait Msg: Debug + Send + Sync {
    /// Module the message is routed to.
    fn route(&self) -> &'static str;

    /// Message name within its route.
    fn kind(&self) -> &'static str;

    /// Stateless checks run before signing.
    fn validate_basic(&self) -> Result<(), MsgError>;

    /// Canonical JSON value included in the sign document.
    fn sign_value(&self) -> Value;

    /// Accounts whose signatures the message requires.
    fn signers(&self) -> Vec<Address>;
}

/// Transfer of coins between two accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgSend {
    pub from: Address,
    pub to: Address,
    pub amount: Coins,
}

impl MsgSend {
    pub fn new(from: Address, to: Address, amount: Coins) -> Self {
        Self { from, to, amount }
    }
}

impl Msg for MsgSend {
    fn route(&self) -> &'static str {
        "bank"
    }

    fn kind(&self) -> &'static str {
        "send"
    }

    fn validate_basic(&self) -> Result<(), MsgError> {
        if self.from == Address::ZERO {
            return Err(MsgError::InvalidAddress(self.from.to_string()));
        }
        if self.to == Address::ZERO {
            return Err(MsgError::InvalidAddress(self.to.to_string()));
        }
        if !self.amount.is_positive() {
            return Err(MsgError::InsufficientCoins(format!(
                "send amount must be positive, got '{}'",
                self.amount
            )));
        }
        Ok(())
    }

    fn sign_value(&self) -> Value {
        json!({
            "type": format!("{}/{}", self.route(), self.kind()),
            "value": {
                "amount": self.amount,
                "from_address": self.from,
                "to_address": self.to,
            }
        })
    }

    fn signers(&self) -> Vec<Address> {
        vec![self.from]
    }
}
