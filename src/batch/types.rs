//! Batch data model: signed batches, broadcast windows and batch requests.

use std::fmt;
use std::num::NonZeroU64;

use alloy::primitives::Address;
use serde::Deserialize;
use thiserror::Error;

use crate::ledger::Credential;
use crate::tx::{Coins, CoinsError};

/// Largest number of transactions one account's batch may hold.
pub const MAX_BATCH_SIZE: u64 = 1_000_000;

/// Half-open range `[start, end)` of sequences a batch occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastWindow {
    start: u64,
    end: u64,
}

impl BroadcastWindow {
    /// `None` when `start + count` does not fit in a sequence number.
    pub fn new(start: u64, count: NonZeroU64) -> Option<Self> {
        let end = start.checked_add(count.get())?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, sequence: u64) -> bool {
        (self.start..self.end).contains(&sequence)
    }
}

impl fmt::Display for BroadcastWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Signed payloads keyed by the contiguous sequences `[start, start + len)`.
///
/// Payloads are stored by offset from the start sequence, so a gap or a
/// repeated sequence cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBatch {
    start: u64,
    payloads: Vec<Vec<u8>>,
}

impl SignedBatch {
    pub(crate) fn with_capacity(start: u64, capacity: usize) -> Self {
        Self {
            start,
            payloads: Vec::with_capacity(capacity),
        }
    }

    /// Append the payload for the next sequence, returning that sequence.
    pub(crate) fn push(&mut self, payload: Vec<u8>) -> u64 {
        let sequence = self.next_sequence();
        self.payloads.push(payload);
        sequence
    }

    #[cfg(test)]
    pub(crate) fn from_payloads(start: u64, payloads: Vec<Vec<u8>>) -> Self {
        Self { start, payloads }
    }

    pub fn start_sequence(&self) -> u64 {
        self.start
    }

    /// Sequence the next appended payload would receive.
    pub fn next_sequence(&self) -> u64 {
        self.start + self.payloads.len() as u64
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Window covered by this batch, `None` while it is empty.
    pub fn window(&self) -> Option<BroadcastWindow> {
        NonZeroU64::new(self.payloads.len() as u64).and_then(|n| BroadcastWindow::new(self.start, n))
    }

    /// Payloads in ascending sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[u8])> + '_ {
        self.payloads
            .iter()
            .enumerate()
            .map(move |(i, p)| (self.start + i as u64, p.as_slice()))
    }
}

/// Invalid batch parameters, rejected before any pipeline starts.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("transaction count must be a positive integer, got {0}")]
    InvalidCount(u64),

    #[error("transaction count {0} exceeds the maximum batch size of {max}", max = MAX_BATCH_SIZE)]
    CountTooLarge(u64),

    #[error("reconciliation step must be a positive integer, got {0}")]
    InvalidStep(u64),

    #[error("source account reference must not be empty")]
    EmptySource,

    #[error("invalid destination address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] CoinsError),

    #[error("amount must be positive, got '{0}'")]
    NonPositiveAmount(String),

    #[error("malformed batch pack: {0}")]
    MalformedPack(#[from] serde_json::Error),

    #[error("batch pack contains no entries")]
    EmptyPack,
}

fn parse_count(count: u64) -> Result<NonZeroU64, RequestError> {
    if count > MAX_BATCH_SIZE {
        return Err(RequestError::CountTooLarge(count));
    }
    NonZeroU64::new(count).ok_or(RequestError::InvalidCount(count))
}

fn parse_step(step: u64) -> Result<NonZeroU64, RequestError> {
    NonZeroU64::new(step).ok_or(RequestError::InvalidStep(step))
}

fn parse_amount(amount: &str) -> Result<Coins, RequestError> {
    let coins: Coins = amount.parse()?;
    if !coins.is_positive() {
        return Err(RequestError::NonPositiveAmount(amount.to_string()));
    }
    Ok(coins)
}

fn parse_source(source: &str) -> Result<String, RequestError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(RequestError::EmptySource);
    }
    Ok(source.to_string())
}

/// Parse a destination reference into an address.
pub fn parse_address(value: &str) -> Result<Address, RequestError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| RequestError::InvalidAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// One account's batch: send `amount` from `source` to `destination`, `count` times.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub source: String,
    pub destination: Address,
    pub amount: Coins,
    pub count: NonZeroU64,
    pub step: NonZeroU64,
    /// Pre-supplied credential; resolved from `source` when absent.
    pub credential: Option<Credential>,
}

impl BatchRequest {
    /// Validate raw parameters into a request.
    pub fn parse(
        source: &str,
        destination: &str,
        amount: &str,
        count: u64,
        step: u64,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            source: parse_source(source)?,
            destination: parse_address(destination)?,
            amount: parse_amount(amount)?,
            count: parse_count(count)?,
            step: parse_step(step)?,
            credential: None,
        })
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Raw `{"from": ..., "to": ...}` entry of a multi-account pack.
#[derive(Debug, Clone, Deserialize)]
pub struct PackEntry {
    pub from: String,
    pub to: String,
}

/// Validated multi-account batch: several (source, destination) pairs
/// sharing one amount, count and step.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    entries: Vec<(String, Address)>,
    amount: Coins,
    count: NonZeroU64,
    step: NonZeroU64,
}

impl BatchPlan {
    pub fn new(
        entries: Vec<PackEntry>,
        amount: &str,
        count: u64,
        step: u64,
    ) -> Result<Self, RequestError> {
        if entries.is_empty() {
            return Err(RequestError::EmptyPack);
        }
        let entries = entries
            .iter()
            .map(|e| Ok((parse_source(&e.from)?, parse_address(&e.to)?)))
            .collect::<Result<Vec<_>, RequestError>>()?;
        Ok(Self {
            entries,
            amount: parse_amount(amount)?,
            count: parse_count(count)?,
            step: parse_step(step)?,
        })
    }

    /// Parse a JSON pack such as `[{"from":"alice","to":"0x.."}]`.
    pub fn from_pack_json(
        pack: &str,
        amount: &str,
        count: u64,
        step: u64,
    ) -> Result<Self, RequestError> {
        let entries: Vec<PackEntry> = serde_json::from_str(pack)?;
        Self::new(entries, amount, count, step)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One request per entry, in entry order.
    pub fn requests(&self) -> Vec<BatchRequest> {
        self.entries
            .iter()
            .map(|(source, destination)| BatchRequest {
                source: source.clone(),
                destination: *destination,
                amount: self.amount.clone(),
                count: self.count,
                step: self.step,
                credential: None,
            })
            .collect()
    }
}
