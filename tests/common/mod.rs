//! Shared utilities for integration tests: an HTTP mock ledger.
//!
//! The mock speaks the same JSON protocol as `LedgerClient` and enforces
//! sequence ordering the way a real ledger does: a transaction is accepted
//! only when it carries the account's current sequence.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use batch_sender::config::LedgerConfig;
use batch_sender::tx::StdTx;

/// Anvil development key #0, address 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266.
pub const ALICE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Anvil development key #1, address 0x70997970C51812dc3A010C7d01b50e0d17dc79C8.
pub const BOB_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const DEST: &str = "0x000000000000000000000000000000000000dEaD";

#[derive(Debug, Clone)]
struct Account {
    account_number: u64,
    sequence: u64,
    coins: Vec<(String, u128)>,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Address, Account>,
    reject: HashSet<u64>,
    /// Accepting sequence `k` moves the account to sequence `v`.
    jumps: HashMap<u64, u64>,
    account_delay: Option<Duration>,
    accepted: Vec<(Address, u64)>,
    rejected: Vec<(Address, u64)>,
}

/// Running mock ledger bound to a local ephemeral port.
#[derive(Clone)]
pub struct MockLedgerServer {
    addr: SocketAddr,
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedgerServer {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(LedgerState::default()));
        let app = Router::new()
            .route("/auth/accounts/{address}", get(account))
            .route("/txs", post(broadcast))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Ledger config pointing at this server.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            rpc_url: self.url(),
            chain_id: "test-chain".to_string(),
            rpc_timeout_secs: 2,
        }
    }

    pub fn add_account(&self, address: Address, account_number: u64, sequence: u64, atoms: u128) {
        self.state.lock().unwrap().accounts.insert(
            address,
            Account {
                account_number,
                sequence,
                coins: vec![("atom".to_string(), atoms)],
            },
        );
    }

    /// Reject any transaction carrying `sequence` with code 32.
    pub fn reject_sequence(&self, sequence: u64) {
        self.state.lock().unwrap().reject.insert(sequence);
    }

    /// After accepting `sequence`, move the account to `to`, as if another
    /// client had submitted transactions concurrently.
    pub fn jump_after(&self, sequence: u64, to: u64) {
        self.state.lock().unwrap().jumps.insert(sequence, to);
    }

    pub fn delay_account_queries(&self, delay: Duration) {
        self.state.lock().unwrap().account_delay = Some(delay);
    }

    pub fn sequence_of(&self, address: Address) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(&address)
            .map(|a| a.sequence)
    }

    /// Sequences accepted for `address`, in acceptance order.
    pub fn accepted(&self, address: Address) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .accepted
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn rejected_count(&self) -> usize {
        self.state.lock().unwrap().rejected.len()
    }
}

type Shared = Arc<Mutex<LedgerState>>;

async fn account(State(state): State<Shared>, Path(address): Path<String>) -> Response {
    let delay = state.lock().unwrap().account_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let Ok(address) = address.parse::<Address>() else {
        return (StatusCode::BAD_REQUEST, "invalid address").into_response();
    };
    let account = state.lock().unwrap().accounts.get(&address).cloned();
    match account {
        None => (StatusCode::NOT_FOUND, "account not found").into_response(),
        Some(account) => {
            let coins: Vec<_> = account
                .coins
                .iter()
                .map(|(denom, amount)| json!({ "denom": denom, "amount": amount.to_string() }))
                .collect();
            Json(json!({
                "address": address,
                "account_number": account.account_number,
                "sequence": account.sequence,
                "coins": coins,
            }))
            .into_response()
        }
    }
}

#[derive(Deserialize)]
struct BroadcastBody {
    tx: String,
    mode: String,
}

async fn broadcast(State(state): State<Shared>, Json(body): Json<BroadcastBody>) -> Response {
    if body.mode != "sync" {
        return (StatusCode::BAD_REQUEST, "unsupported mode").into_response();
    }
    let Ok(bytes) = alloy::hex::decode(&body.tx) else {
        return (StatusCode::BAD_REQUEST, "tx is not hex").into_response();
    };
    let Ok(tx) = StdTx::decode(&bytes) else {
        return (StatusCode::BAD_REQUEST, "tx is not a StdTx").into_response();
    };
    let Some(sig) = tx.signatures.first() else {
        return (StatusCode::BAD_REQUEST, "unsigned tx").into_response();
    };
    let (signer, sequence) = (sig.signer, sig.sequence);

    let mut guard = state.lock().unwrap();
    let state: &mut LedgerState = &mut guard;
    let reject = |state: &mut LedgerState, log: String| {
        state.rejected.push((signer, sequence));
        Json(json!({ "hash": "", "code": 32, "log": log })).into_response()
    };

    if state.reject.contains(&sequence) {
        return reject(state, format!("sequence {} refused", sequence));
    }
    let Some(expected) = state.accounts.get(&signer).map(|a| a.sequence) else {
        return reject(state, format!("unknown signer {}", signer));
    };
    if sequence != expected {
        return reject(
            state,
            format!("incorrect account sequence: expected {}, got {}", expected, sequence),
        );
    }

    let next = state.jumps.get(&sequence).copied().unwrap_or(sequence + 1);
    if let Some(account) = state.accounts.get_mut(&signer) {
        account.sequence = next;
    }
    state.accepted.push((signer, sequence));

    Json(json!({
        "hash": format!("{:064x}", sequence),
        "code": 0,
        "log": "",
    }))
    .into_response()
}
