//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BatchConfig (validated, immutable)
//!     → shared read-only by every account pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BatchConfig;
pub use schema::{FeeConfig, KeysConfig, LedgerConfig, ObservabilityConfig, PacingConfig};
pub use validation::ValidationError;
