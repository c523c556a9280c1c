//! Transaction construction subsystem.
//!
//! # Data Flow
//! ```text
//! coins.rs (amount parsing)
//!     → msgs.rs (MsgSend and the Msg trait)
//!     → context.rs (account number, sequence, fee)
//!     → codec.rs (build + sign → bytes)
//! ```
//!
//! # Design Decisions
//! - Signing is local and synchronous; the codec never sees a ledger handle
//! - A `TxContext` is consumed per transaction; `next()` hands out the successor

pub mod codec;
pub mod coins;
pub mod context;
pub mod msgs;

pub use codec::{SigningError, StdTx, StdTxBuilder, TxBuilder};
pub use coins::{Coin, Coins, CoinsError};
pub use context::{Fee, SigningParams, TxContext};
pub use msgs::{Msg, MsgError, MsgSend};
