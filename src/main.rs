//! batch-send: sign and broadcast transaction batches.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI arguments + config.toml
//!        │
//!        ▼
//!   BatchRequest / BatchPlan ──▶ MultiAccountOrchestrator (one task per account)
//!                                        │
//!                                        ▼
//!                   ┌──────────── Pipeline (per account) ────────────┐
//!                   │ SequenceAllocator → BatchSigner → BroadcastPacer │
//!                   └──────────────────────┬─────────────────────────┘
//!                                          │ HTTP/JSON
//!                                          ▼
//!                                    Ledger endpoint
//! ```
//!
//! Private keys come from `--key` or from `<env_prefix><SOURCE>` variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use batch_sender::batch::{
    BatchPlan, BatchRequest, MultiAccountOrchestrator, Pipeline, PipelineOutcome,
};
use batch_sender::config::{load_config, BatchConfig};
use batch_sender::ledger::{Credential, EnvCredentialResolver, LedgerClient};
use batch_sender::observability::{logging, metrics};
use batch_sender::tx::{SigningParams, StdTxBuilder};

#[derive(Parser)]
#[command(name = "batch-send", version)]
#[command(about = "Sign and broadcast batches of ordered transactions", long_about = None)]
struct Cli {
    /// Path to a TOML config file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single transaction
    Send {
        /// Source account name, used to find its key
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Coins per transaction, e.g. "10atom" or "10atom,5stake"
        #[arg(long)]
        amount: String,
        /// Hex private key, overrides the environment lookup
        #[arg(long)]
        key: Option<String>,
    },
    /// Sign N transactions offline, then broadcast them in order
    BatchSend {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        count: u64,
        /// Broadcasts between sequence checks (default: pacing.default_step)
        #[arg(long)]
        step: Option<u64>,
        #[arg(long)]
        key: Option<String>,
    },
    /// Run one batch per account concurrently
    MultiSend {
        /// JSON array of {"from","to"} entries, or @path to a file holding it
        #[arg(long)]
        pack: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        count: u64,
        #[arg(long)]
        step: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BatchConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("batch-send v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let pipeline = build_pipeline(&config)?;
    let default_step = config.pacing.default_step;

    match cli.command {
        Commands::Send {
            from,
            to,
            amount,
            key,
        } => {
            let request = with_key(BatchRequest::parse(&from, &to, &amount, 1, 1)?, key)?;
            match pipeline.send_single(request).await {
                Ok(receipt) => {
                    println!(
                        "{}: sent sequence {} from {} (tx {})",
                        from, receipt.sequence, receipt.address, receipt.hash
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}: {}", from, e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::BatchSend {
            from,
            to,
            amount,
            count,
            step,
            key,
        } => {
            let step = step.unwrap_or(default_step);
            let request = with_key(BatchRequest::parse(&from, &to, &amount, count, step)?, key)?;
            let outcome = PipelineOutcome {
                source: from,
                result: pipeline.run(request).await,
            };
            print_outcome(&outcome);
            Ok(exit_code(std::slice::from_ref(&outcome)))
        }
        Commands::MultiSend {
            pack,
            amount,
            count,
            step,
        } => {
            let step = step.unwrap_or(default_step);
            let plan = BatchPlan::from_pack_json(&read_pack(&pack)?, &amount, count, step)?;
            let outcomes = MultiAccountOrchestrator::new(Arc::new(pipeline))
                .run(&plan)
                .await;
            outcomes.iter().for_each(print_outcome);
            Ok(exit_code(&outcomes))
        }
    }
}

fn build_pipeline(config: &BatchConfig) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let ledger = LedgerClient::new(config.ledger.clone())?;
    let params = SigningParams::from_config(&config.ledger, &config.fee)?;
    let resolver = EnvCredentialResolver::new(config.keys.env_prefix.clone());

    Ok(Pipeline::new(
        Arc::new(ledger),
        Arc::new(StdTxBuilder::new()),
        Arc::new(resolver),
        Arc::new(params),
        Duration::from_millis(config.pacing.interval_ms),
    ))
}

fn with_key(
    request: BatchRequest,
    key: Option<String>,
) -> Result<BatchRequest, Box<dyn std::error::Error>> {
    Ok(match key {
        Some(key) => request.with_credential(Credential::from_private_key(&key)?),
        None => request,
    })
}

fn read_pack(pack: &str) -> std::io::Result<String> {
    match pack.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path)),
        None => Ok(pack.to_string()),
    }
}

fn print_outcome(outcome: &PipelineOutcome) {
    match &outcome.result {
        Ok(report) => {
            println!(
                "{}: completed window {} from {} ({} accepted, {} failed)",
                outcome.source,
                report.window,
                report.address,
                report.accepted(),
                report.failures.len()
            );
            for failure in &report.failures {
                println!("  sequence {}: {}", failure.sequence, failure.error);
            }
        }
        Err(e) => println!("{}: aborted: {}", outcome.source, e),
    }
}

fn exit_code(outcomes: &[PipelineOutcome]) -> ExitCode {
    if outcomes.iter().all(PipelineOutcome::is_completed) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
