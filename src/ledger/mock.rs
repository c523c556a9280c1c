//! In-memory ledger used by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::ledger::client::Ledger;
use crate::ledger::types::{AccountInfo, BroadcastAck, LedgerError, LedgerResult};
use crate::tx::StdTx;

#[derive(Default)]
struct MockState {
    accounts: HashMap<Address, AccountInfo>,
    sequence_script: VecDeque<u64>,
    fail_sequences: HashSet<u64>,
    fail_sequence_queries: bool,
    broadcasts: Vec<u64>,
    account_queries: usize,
    sequence_queries: usize,
}

/// Ledger double with call counters, scripted reconciliation answers and
/// per-sequence broadcast failures.
///
/// Payloads are identified by sequence: signed `StdTx` bytes are decoded,
/// anything else must be an 8-byte big-endian sequence.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
    broadcast_delay: Option<Duration>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, address: Address, account_number: u64, sequence: u64, coins: &str) -> Self {
        self.lock().accounts.insert(
            address,
            AccountInfo {
                address,
                account_number,
                sequence,
                coins: coins.parse().expect("test coins"),
            },
        );
        self
    }

    /// Values returned, in order, by the next `sequence` calls.
    pub fn with_sequence_script(self, script: impl IntoIterator<Item = u64>) -> Self {
        self.lock().sequence_script.extend(script);
        self
    }

    /// Broadcasts carrying these sequences are rejected.
    pub fn failing(self, sequences: impl IntoIterator<Item = u64>) -> Self {
        self.lock().fail_sequences.extend(sequences);
        self
    }

    pub fn failing_sequence_queries(self) -> Self {
        self.lock().fail_sequence_queries = true;
        self
    }

    pub fn with_broadcast_delay(mut self, delay: Duration) -> Self {
        self.broadcast_delay = Some(delay);
        self
    }

    pub fn account_queries(&self) -> usize {
        self.lock().account_queries
    }

    pub fn sequence_queries(&self) -> usize {
        self.lock().sequence_queries
    }

    /// Sequences of every broadcast attempt, in submission order.
    pub fn broadcasts(&self) -> Vec<u64> {
        self.lock().broadcasts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock ledger poisoned")
    }
}

fn decode_payload(tx: &[u8]) -> (u64, Option<Address>) {
    if let Ok(std_tx) = StdTx::decode(tx) {
        if let Some(sig) = std_tx.signatures.first() {
            return (sig.sequence, Some(sig.signer));
        }
    }
    let raw: [u8; 8] = tx.try_into().expect("test payload must be 8 bytes");
    (u64::from_be_bytes(raw), None)
}

#[async_trait]
impl Ledger for MockLedger {
    async fn account(&self, address: Address) -> LedgerResult<Option<AccountInfo>> {
        let mut state = self.lock();
        state.account_queries += 1;
        Ok(state.accounts.get(&address).cloned())
    }

    async fn sequence(&self, address: Address) -> LedgerResult<u64> {
        let mut state = self.lock();
        state.sequence_queries += 1;
        if state.fail_sequence_queries {
            return Err(LedgerError::Rpc("connection reset".to_string()));
        }
        if let Some(scripted) = state.sequence_script.pop_front() {
            return Ok(scripted);
        }
        state
            .accounts
            .get(&address)
            .map(|a| a.sequence)
            .ok_or(LedgerError::AccountNotFound(address))
    }

    async fn broadcast(&self, tx: &[u8]) -> LedgerResult<BroadcastAck> {
        if let Some(delay) = self.broadcast_delay {
            tokio::time::sleep(delay).await;
        }
        let (sequence, signer) = decode_payload(tx);
        let mut state = self.lock();
        state.broadcasts.push(sequence);
        if state.fail_sequences.contains(&sequence) {
            return Err(LedgerError::Rejected {
                code: 32,
                log: format!("sequence {} rejected", sequence),
            });
        }
        if let Some(account) = signer.and_then(|s| state.accounts.get_mut(&s)) {
            if account.sequence == sequence {
                account.sequence += 1;
            }
        }
        Ok(BroadcastAck {
            hash: format!("{:064x}", sequence),
            code: 0,
            log: String::new(),
        })
    }
}
