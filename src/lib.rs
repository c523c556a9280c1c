//! Batch transaction sender.
//!
//! Signs a batch of transactions for one or more accounts offline, then
//! broadcasts each account's batch in sequence order while periodically
//! checking the ledger's view of the account sequence.

// Core subsystems
pub mod batch;
pub mod ledger;
pub mod tx;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use batch::{
    BatchPlan, BatchRequest, MultiAccountOrchestrator, Pipeline, PipelineError, PipelineOutcome,
    PipelineReport,
};
pub use config::BatchConfig;
pub use ledger::{Ledger, LedgerClient};
