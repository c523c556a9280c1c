//! Fan-out of one pipeline per account.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::batch::error::PipelineError;
use crate::batch::pipeline::{Pipeline, PipelineOutcome};
use crate::batch::types::BatchPlan;

/// Runs every entry of a [`BatchPlan`] as an independent task.
///
/// There is no cancellation between siblings: a pipeline that aborts leaves
/// the others running, and `run` returns once all of them are terminal.
pub struct MultiAccountOrchestrator {
    pipeline: Arc<Pipeline>,
}

impl MultiAccountOrchestrator {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Outcomes are returned in plan entry order.
    pub async fn run(&self, plan: &BatchPlan) -> Vec<PipelineOutcome> {
        tracing::info!(accounts = plan.len(), "Starting multi-account batch");

        let (sources, handles): (Vec<_>, Vec<_>) = plan
            .requests()
            .into_iter()
            .map(|request| {
                let pipeline = Arc::clone(&self.pipeline);
                let source = request.source.clone();
                (source, tokio::spawn(async move { pipeline.run(request).await }))
            })
            .unzip();

        let outcomes: Vec<PipelineOutcome> = sources
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(source, joined)| PipelineOutcome {
                source,
                result: joined.unwrap_or_else(|e| Err(PipelineError::Panicked(e.to_string()))),
            })
            .collect();

        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        tracing::info!(
            completed,
            aborted = outcomes.len() - completed,
            "Multi-account batch finished"
        );
        outcomes
    }
}
