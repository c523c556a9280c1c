//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every pipeline produces:
//!     → logging.rs (structured progress and error events)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (human operator watching a long batch)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Each pipeline runs inside a span carrying its source and run id
//! - Metrics are cheap (atomic increments) and safe to record from every pipeline

pub mod logging;
pub mod metrics;
