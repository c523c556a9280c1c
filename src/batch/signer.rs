//! Offline signing of a whole batch.
//!
//! The signer has no ledger handle; producing a batch cannot touch the network.
//! Any failure discards everything signed so far.

use std::num::NonZeroU64;
use std::sync::Arc;

use crate::batch::allocator::AccountIdentity;
use crate::batch::error::PipelineError;
use crate::batch::types::{BroadcastWindow, SignedBatch};
use crate::ledger::Credential;
use crate::observability::metrics;
use crate::tx::{Msg, SigningParams, TxBuilder, TxContext};

/// Upper bound on payload slots reserved before signing starts.
const PREALLOCATE_LIMIT: usize = 4096;

pub struct BatchSigner<'a> {
    builder: &'a dyn TxBuilder,
    params: Arc<SigningParams>,
}

impl<'a> BatchSigner<'a> {
    pub fn new(builder: &'a dyn TxBuilder, params: Arc<SigningParams>) -> Self {
        Self { builder, params }
    }

    /// Sign `count` transactions carrying `msgs`, one per consecutive sequence
    /// starting at the identity's cursor. The cursor ends at `start + count`.
    pub fn sign_batch(
        &self,
        identity: &mut AccountIdentity,
        credential: &Credential,
        msgs: &[Box<dyn Msg>],
        count: NonZeroU64,
    ) -> Result<SignedBatch, PipelineError> {
        let total = count.get();
        let start = identity.cursor().current();
        let account_number = identity.account_number();
        let overflow = PipelineError::SequenceOverflow {
            start,
            count: total,
        };
        if BroadcastWindow::new(start, count).is_none() {
            return Err(overflow);
        }

        let capacity = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .min(PREALLOCATE_LIMIT);
        let mut batch = SignedBatch::with_capacity(start, capacity);
        let mut ctx = TxContext::new(self.params.clone(), account_number, start);

        for signed in 0..total {
            let sequence = ctx.sequence();
            debug_assert_eq!(sequence, identity.cursor().current());

            let payload = self
                .builder
                .build_and_sign(&ctx, credential, msgs)
                .map_err(|source| PipelineError::Signing { sequence, source })?;
            let size = payload.len();
            batch.push(payload);
            metrics::record_signed();

            tracing::info!(
                account_number,
                sequence,
                size,
                progress = signed * 100 / total,
                "Signed transaction"
            );

            identity.cursor_mut().advance();
            // The window check above keeps start + count representable.
            ctx = match ctx.next() {
                Some(next) => next,
                None => return Err(overflow),
            };
        }

        Ok(batch)
    }

    /// Sign one transaction at the cursor, returning its sequence and payload.
    pub fn sign_one(
        &self,
        identity: &mut AccountIdentity,
        credential: &Credential,
        msgs: &[Box<dyn Msg>],
    ) -> Result<(u64, Vec<u8>), PipelineError> {
        let sequence = identity.cursor().current();
        let ctx = TxContext::new(self.params.clone(), identity.account_number(), sequence);
        let payload = self
            .builder
            .build_and_sign(&ctx, credential, msgs)
            .map_err(|source| PipelineError::Signing { sequence, source })?;
        metrics::record_signed();
        tracing::info!(
            account_number = identity.account_number(),
            sequence,
            size = payload.len(),
            "Signed transaction"
        );

        identity.cursor_mut().advance();
        Ok((sequence, payload))
    }
}
