//! Transaction encoding and signing.
//!
//! # Data Flow
//! ```text
//! TxContext + messages
//!     → validate_basic / signer check
//!     → StdSignDoc (JSON, fixed field order)
//!     → keccak256 → secp256k1 signature
//!     → StdTx JSON bytes
//! ```
//!
//! Nothing here touches the network.

use alloy::primitives::{keccak256, Address};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ledger::credential::{Credential, CredentialError};
use crate::tx::context::{Fee, TxContext};
use crate::tx::msgs::{Msg, MsgError};

/// Errors that make a transaction impossible to sign.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("transaction has no messages")]
    NoMessages,

    #[error("invalid {route}/{kind} message: {source}")]
    InvalidMessage {
        route: &'static str,
        kind: &'static str,
        source: MsgError,
    },

    #[error("message requires signer {expected}, credential is for {actual}")]
    SignerMismatch { expected: Address, actual: Address },

    #[error("encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Builds the signed bytes for one transaction. Must not perform I/O.
pub trait TxBuilder: Send + Sync {
    fn build_and_sign(
        &self,
        ctx: &TxContext,
        credential: &Credential,
        msgs: &[Box<dyn Msg>],
    ) -> Result<Vec<u8>, SigningError>;
}

/// The document a signature commits to. Field order is the canonical order.
#[derive(Debug, Serialize)]
struct StdSignDoc<'a> {
    account_number: u64,
    chain_id: &'a str,
    fee: &'a Fee,
    memo: &'a str,
    msgs: Vec<Value>,
    sequence: u64,
}

/// Signature entry of a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub signer: Address,
    pub signature: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// A signed transaction as broadcast to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<Value>,
    pub fee: Value,
    pub memo: String,
    pub signatures: Vec<StdSignature>,
}

impl StdTx {
    /// Decode broadcast bytes back into a transaction.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// JSON sign-doc builder with keccak256/secp256k1 signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTxBuilder;

impl StdTxBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Bytes a signature over `ctx` and `msgs` commits to.
    pub fn sign_bytes(ctx: &TxContext, msgs: &[Box<dyn Msg>]) -> Result<Vec<u8>, SigningError> {
        let params = ctx.params();
        let doc = StdSignDoc {
            account_number: ctx.account_number(),
            chain_id: &params.chain_id,
            fee: &params.fee,
            memo: &params.memo,
            msgs: msgs.iter().map(|m| m.sign_value()).collect(),
            sequence: ctx.sequence(),
        };
        Ok(serde_json::to_vec(&doc)?)
    }
}

impl TxBuilder for StdTxBuilder {
    fn build_and_sign(
        &self,
        ctx: &TxContext,
        credential: &Credential,
        msgs: &[Box<dyn Msg>],
    ) -> Result<Vec<u8>, SigningError> {
        if msgs.is_empty() {
            return Err(SigningError::NoMessages);
        }

        let signer = credential.address();
        for msg in msgs {
            msg.validate_basic()
                .map_err(|source| SigningError::InvalidMessage {
                    route: msg.route(),
                    kind: msg.kind(),
                    source,
                })?;
            if let Some(expected) = msg.signers().into_iter().find(|s| *s != signer) {
                return Err(SigningError::SignerMismatch {
                    expected,
                    actual: signer,
                });
            }
        }

        let digest = keccak256(Self::sign_bytes(ctx, msgs)?);
        let signature = credential.sign_hash(&digest)?;

        let tx = StdTx {
            msg: msgs.iter().map(|m| m.sign_value()).collect(),
            fee: serde_json::to_value(&ctx.params().fee)?,
            memo: ctx.params().memo.clone(),
            signatures: vec![StdSignature {
                signer,
                signature: alloy::hex::encode_prefixed(signature.as_bytes()),
                account_number: ctx.account_number(),
                sequence: ctx.sequence(),
            }],
        };
        Ok(serde_json::to_vec(&tx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::credential::tests::{TEST_KEY_0, TEST_KEY_1};
    use crate::tx::context::SigningParams;
    use crate::tx::msgs::MsgSend;
    use crate::tx::Coins;
    use std::sync::Arc;

    fn params() -> Arc<SigningParams> {
        Arc::new(SigningParams {
            chain_id: "multicoin".to_string(),
            fee: Fee {
                amount: "1stake".parse().unwrap(),
                gas: 200_000,
            },
            memo: "batch".to_string(),
        })
    }

    fn send_from(credential: &Credential, amount: &str) -> Vec<Box<dyn Msg>> {
        vec![Box::new(MsgSend::new(
            credential.address(),
            Address::repeat_byte(9),
            amount.parse().unwrap(),
        ))]
    }

    #[test]
    fn test_signed_tx_carries_context() {
        let credential = Credential::from_private_key(TEST_KEY_0).unwrap();
        let ctx = TxContext::new(params(), 3, 17);
        let bytes = StdTxBuilder::new()
            .build_and_sign(&ctx, &credential, &send_from(&credential, "10atom"))
            .unwrap();

        let tx = StdTx::decode(&bytes).unwrap();
        assert_eq!(tx.memo, "batch");
        assert_eq!(tx.msg.len(), 1);
        assert_eq!(tx.signatures.len(), 1);
        let sig = &tx.signatures[0];
        assert_eq!(sig.signer, credential.address());
        assert_eq!(sig.account_number, 3);
        assert_eq!(sig.sequence, 17);
        // 0x + 65 bytes hex
        assert_eq!(sig.signature.len(), 2 + 130);
    }

    #[test]
    fn test_sequence_changes_signature() {
        let credential = Credential::from_private_key(TEST_KEY_0).unwrap();
        let msgs = send_from(&credential, "10atom");
        let builder = StdTxBuilder::new();
        let ctx = TxContext::new(params(), 3, 17);
        let first = builder.build_and_sign(&ctx, &credential, &msgs).unwrap();
        let second = builder.build_and_sign(&ctx.next().unwrap(), &credential, &msgs).unwrap();

        let first = StdTx::decode(&first).unwrap();
        let second = StdTx::decode(&second).unwrap();
        assert_ne!(first.signatures[0].signature, second.signatures[0].signature);
    }

    #[test]
    fn test_signature_recovers_signer() {
        let credential = Credential::from_private_key(TEST_KEY_1).unwrap();
        let msgs = send_from(&credential, "10atom");
        let ctx = TxContext::new(params(), 0, 0);
        let bytes = StdTxBuilder::new()
            .build_and_sign(&ctx, &credential, &msgs)
            .unwrap();
        let tx = StdTx::decode(&bytes).unwrap();

        let raw = alloy::hex::decode(&tx.signatures[0].signature).unwrap();
        let signature = alloy::primitives::Signature::try_from(raw.as_slice()).unwrap();
        let digest = keccak256(StdTxBuilder::sign_bytes(&ctx, &msgs).unwrap());
        let recovered = signature.recover_address_from_prehash(&digest).unwrap();
        assert_eq!(recovered, credential.address());
    }

    #[test]
    fn test_invalid_message_rejected() {
        let credential = Credential::from_private_key(TEST_KEY_0).unwrap();
        let msgs: Vec<Box<dyn Msg>> = vec![Box::new(MsgSend::new(
            credential.address(),
            Address::repeat_byte(9),
            Coins::default(),
        ))];
        let err = StdTxBuilder::new()
            .build_and_sign(&TxContext::new(params(), 0, 0), &credential, &msgs)
            .unwrap_err();
        assert!(matches!(err, SigningError::InvalidMessage { kind: "send", .. }));
    }

    #[test]
    fn test_foreign_signer_rejected() {
        let credential = Credential::from_private_key(TEST_KEY_0).unwrap();
        let other = Credential::from_private_key(TEST_KEY_1).unwrap();
        let err = StdTxBuilder::new()
            .build_and_sign(
                &TxContext::new(params(), 0, 0),
                &credential,
                &send_from(&other, "10atom"),
            )
            .unwrap_err();
        assert!(matches!(err, SigningError::SignerMismatch { .. }));
    }

    #[test]
    fn test_empty_messages_rejected() {
        let credential = Credential::from_private_key(TEST_KEY_0).unwrap();
        let err = StdTxBuilder::new()
            .build_and_sign(&TxContext::new(params(), 0, 0), &credential, &[])
            .unwrap_err();
        assert!(matches!(err, SigningError::NoMessages));
    }
}
