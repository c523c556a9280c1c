//! Batch submission subsystem.
//!
//! # Data Flow
//! ```text
//! BatchRequest / BatchPlan (validated input)
//!     → allocator.rs (one account query, owned sequence cursor)
//!     → signer.rs (sign N transactions offline → SignedBatch)
//!     → pacer.rs (ordered broadcast with periodic reconciliation)
//! pipeline.rs ties the three together for one account;
//! orchestrator.rs runs one pipeline per account concurrently.
//! ```
//!
//! # Failure Policy
//! - Account lookup, credential, balance and signing failures abort before any broadcast
//! - A rejected broadcast is recorded and the batch continues
//! - A remote sequence outside the batch window aborts the remaining broadcasts
//! - Pipelines never cancel each other

pub mod allocator;
pub mod error;
pub mod orchestrator;
pub mod pacer;
pub mod pipeline;
pub mod signer;
pub mod types;

pub use allocator::{AccountIdentity, SequenceAllocator, SequenceCursor};
pub use error::{BroadcastFailure, PipelineError, PipelineStage};
pub use orchestrator::MultiAccountOrchestrator;
pub use pacer::{BroadcastPacer, BroadcastReport};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineReport, SendReceipt};
pub use signer::BatchSigner;
pub use types::{
    parse_address, BatchPlan, BatchRequest, BroadcastWindow, PackEntry, RequestError, SignedBatch,
};
