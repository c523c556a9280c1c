//! One account's batch, from account lookup to the last broadcast.
//!
//! ```text
//! Bootstrapping → Signing → Broadcasting → Completed
//!       ↓            ↓           ↓
//!    Aborted      Aborted     Aborted
//! ```
//!
//! Signing runs on the blocking pool and finishes before the first broadcast.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tracing::Instrument;
use uuid::Uuid;

use crate::batch::allocator::{AccountIdentity, SequenceAllocator};
use crate::batch::error::{BroadcastFailure, PipelineError, PipelineStage};
use crate::batch::pacer::BroadcastPacer;
use crate::batch::signer::BatchSigner;
use crate::batch::types::{BatchRequest, BroadcastWindow};
use crate::ledger::{Credential, CredentialResolver, Ledger};
use crate::observability::metrics;
use crate::tx::{Msg, MsgSend, SigningParams, TxBuilder};

/// Summary of a pipeline that reached `Completed`.
#[derive(Debug)]
pub struct PipelineReport {
    pub source: String,
    pub address: Address,
    pub account_number: u64,
    pub window: BroadcastWindow,
    pub attempted: u64,
    pub failures: Vec<BroadcastFailure>,
}

impl PipelineReport {
    /// Broadcasts the ledger accepted.
    pub fn accepted(&self) -> u64 {
        self.attempted - self.failures.len() as u64
    }
}

/// Terminal result of one entry of a multi-account run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub source: String,
    pub result: Result<PipelineReport, PipelineError>,
}

impl PipelineOutcome {
    pub fn stage(&self) -> PipelineStage {
        match self.result {
            Ok(_) => PipelineStage::Completed,
            Err(_) => PipelineStage::Aborted,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Receipt of a single-transaction send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub address: Address,
    pub account_number: u64,
    pub sequence: u64,
    pub hash: String,
}

/// Collaborators shared read-only by every pipeline.
pub struct Pipeline {
    ledger: Arc<dyn Ledger>,
    builder: Arc<dyn TxBuilder>,
    resolver: Arc<dyn CredentialResolver>,
    params: Arc<SigningParams>,
    interval: Duration,
}

/// State carried from Bootstrapping into Signing.
struct Prepared {
    credential: Credential,
    identity: AccountIdentity,
    window: BroadcastWindow,
    msgs: Vec<Box<dyn Msg>>,
}

impl Pipeline {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        builder: Arc<dyn TxBuilder>,
        resolver: Arc<dyn CredentialResolver>,
        params: Arc<SigningParams>,
        interval: Duration,
    ) -> Self {
        Self {
            ledger,
            builder,
            resolver,
            params,
            interval,
        }
    }

    /// Run the full batch for one account.
    pub async fn run(&self, request: BatchRequest) -> Result<PipelineReport, PipelineError> {
        let span = tracing::info_span!(
            "pipeline",
            source = %request.source,
            run_id = %Uuid::new_v4()
        );
        let result = self.execute(request).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(report) => {
                metrics::record_pipeline_outcome("completed");
                tracing::info!(
                    window = %report.window,
                    attempted = report.attempted,
                    failed = report.failures.len(),
                    "Pipeline completed"
                );
            }
            Err(e) => {
                metrics::record_pipeline_outcome("aborted");
                tracing::error!(
                    stage = ?e.stage(),
                    error = %e,
                    "Pipeline aborted"
                );
            }
        });

        result
    }

    /// Bootstrap, sign and broadcast exactly one transaction.
    ///
    /// Unlike a batch, a rejected broadcast is returned as an error.
    pub async fn send_single(&self, request: BatchRequest) -> Result<SendReceipt, PipelineError> {
        let span = tracing::info_span!(
            "send",
            source = %request.source,
            run_id = %Uuid::new_v4()
        );

        async move {
            let prepared = self.bootstrap(&request, NonZeroU64::MIN).await?;
            let (identity, (sequence, payload)) = self
                .sign(prepared, |signer, identity, credential, msgs| {
                    signer.sign_one(identity, credential, msgs)
                })
                .await?;

            enter(PipelineStage::Broadcasting);
            let ack = self
                .ledger
                .broadcast(&payload)
                .await
                .map_err(|source| PipelineError::Broadcast { sequence, source })?;

            tracing::info!(sequence, hash = %ack.hash, "Transaction sent");
            Ok(SendReceipt {
                address: identity.address(),
                account_number: identity.account_number(),
                sequence,
                hash: ack.hash,
            })
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, request: BatchRequest) -> Result<PipelineReport, PipelineError> {
        let step = request.step;
        let count = request.count;
        let prepared = self.bootstrap(&request, count).await?;
        let window = prepared.window;
        let (identity, batch) = self
            .sign(prepared, move |signer, identity, credential, msgs| {
                signer.sign_batch(identity, credential, msgs, count)
            })
            .await?;

        enter(PipelineStage::Broadcasting);
        let report = BroadcastPacer::new(self.ledger.as_ref(), step, self.interval)
            .drain(identity.address(), identity.account_number(), &batch)
            .await?;

        enter(PipelineStage::Completed);
        Ok(PipelineReport {
            source: request.source,
            address: identity.address(),
            account_number: identity.account_number(),
            window,
            attempted: report.attempted,
            failures: report.failures,
        })
    }

    async fn bootstrap(
        &self,
        request: &BatchRequest,
        count: NonZeroU64,
    ) -> Result<Prepared, PipelineError> {
        enter(PipelineStage::Bootstrapping);

        let credential = match &request.credential {
            Some(credential) => credential.clone(),
            None => self.resolver.resolve(&request.source)?,
        };
        let identity = SequenceAllocator::new(self.ledger.as_ref())
            .bootstrap(credential.address())
            .await?;

        if !identity.balance().is_gte(&request.amount) {
            return Err(PipelineError::InsufficientFunds {
                address: identity.address(),
                required: request.amount.clone(),
                available: identity.balance().clone(),
            });
        }

        let start = identity.start_sequence();
        let window =
            BroadcastWindow::new(start, count).ok_or(PipelineError::SequenceOverflow {
                start,
                count: count.get(),
            })?;

        let msgs: Vec<Box<dyn Msg>> = vec![Box::new(MsgSend::new(
            identity.address(),
            request.destination,
            request.amount.clone(),
        ))];

        Ok(Prepared {
            credential,
            identity,
            window,
            msgs,
        })
    }

    /// Run `sign` on the blocking pool with the prepared identity.
    async fn sign<T, F>(&self, prepared: Prepared, sign: F) -> Result<(AccountIdentity, T), PipelineError>
    where
        T: Send + 'static,
        F: FnOnce(
                &BatchSigner<'_>,
                &mut AccountIdentity,
                &Credential,
                &[Box<dyn Msg>],
            ) -> Result<T, PipelineError>
            + Send
            + 'static,
    {
        enter(PipelineStage::Signing);

        let builder = Arc::clone(&self.builder);
        let params = Arc::clone(&self.params);
        let span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let Prepared {
                credential,
                mut identity,
                msgs,
                ..
            } = prepared;
            let signed = sign(
                &BatchSigner::new(builder.as_ref(), params),
                &mut identity,
                &credential,
                &msgs,
            )?;
            Ok::<_, PipelineError>((identity, signed))
        })
        .await
        .map_err(|e| PipelineError::Panicked(e.to_string()))?
    }
}

fn enter(stage: PipelineStage) {
    tracing::debug!(%stage, "Pipeline stage");
}
