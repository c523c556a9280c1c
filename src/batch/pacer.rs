//! Paced, in-order broadcast of a signed batch.
//!
//! # Algorithm
//! ```text
//! sent = 0
//! for each (sequence, payload) in ascending order:
//!     if sent > 0 and sent % step == 0:
//!         observed = ledger.sequence(address)      // reconciliation
//!         observed outside [start, start+N)  → abort with SequenceDrift
//!         sleep(interval)
//!     broadcast(payload)                           // failure is recorded, not fatal
//!     sent += 1
//! ```

use std::num::NonZeroU64;
use std::time::{Duration, Instant};

use alloy::primitives::Address;

use crate::batch::error::{BroadcastFailure, PipelineError};
use crate::batch::types::SignedBatch;
use crate::ledger::Ledger;
use crate::observability::metrics;

/// Result of draining a batch.
#[derive(Debug)]
pub struct BroadcastReport {
    /// Broadcasts attempted, successful or not.
    pub attempted: u64,
    /// Broadcasts the ledger did not accept, in sequence order.
    pub failures: Vec<BroadcastFailure>,
}

pub struct BroadcastPacer<'a> {
    ledger: &'a dyn Ledger,
    step: NonZeroU64,
    interval: Duration,
}

impl<'a> BroadcastPacer<'a> {
    /// `step` broadcasts separate reconciliation checks; `interval` is the
    /// pause taken after each check.
    pub fn new(ledger: &'a dyn Ledger, step: NonZeroU64, interval: Duration) -> Self {
        Self {
            ledger,
            step,
            interval,
        }
    }

    /// Broadcast every payload of `batch` in ascending sequence order.
    pub async fn drain(
        &self,
        address: Address,
        account_number: u64,
        batch: &SignedBatch,
    ) -> Result<BroadcastReport, PipelineError> {
        let Some(window) = batch.window() else {
            return Ok(BroadcastReport {
                attempted: 0,
                failures: Vec::new(),
            });
        };
        let total = window.len();
        let step = self.step.get();
        let mut sent = 0u64;
        let mut failures = Vec::new();

        for (sequence, payload) in batch.iter() {
            if sent > 0 && sent % step == 0 {
                let observed = self
                    .ledger
                    .sequence(address)
                    .await
                    .map_err(|source| PipelineError::Reconcile { sent, source })?;
                metrics::record_reconciliation();

                if !window.contains(observed) {
                    metrics::record_drift_abort();
                    tracing::error!(
                        account_number,
                        expected = %window,
                        observed,
                        next = sequence,
                        "Remote sequence outside batch window"
                    );
                    return Err(PipelineError::SequenceDrift {
                        window,
                        next: sequence,
                        observed,
                    });
                }

                tracing::debug!(account_number, observed, sent, "Sequence reconciled");
                tokio::time::sleep(self.interval).await;
            }

            let started = Instant::now();
            let result = self.ledger.broadcast(payload).await;
            metrics::record_broadcast(result.is_ok(), started.elapsed());

            match result {
                Ok(ack) => {
                    tracing::debug!(sequence, hash = %ack.hash, "Broadcast accepted");
                }
                Err(error) => {
                    tracing::warn!(
                        account_number,
                        sequence,
                        error = %error,
                        "Broadcast failed, continuing with next sequence"
                    );
                    failures.push(BroadcastFailure { sequence, error });
                }
            }

            sent += 1;
            tracing::info!(
                account_number,
                sequence,
                progress = sent * 100 / total,
                "Broadcast transaction"
            );
        }

        Ok(BroadcastReport {
            attempted: sent,
            failures,
        })
    }
}
