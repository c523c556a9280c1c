//! Ledger RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Query account state (existence, account number, sequence, coins)
//! - Submit signed transactions
//! - Bound every request with a timeout so a hung call cannot stall a pipeline

use std::future::Future;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::timeout;
use url::Url;

use crate::ledger::types::{AccountInfo, BroadcastAck, LedgerConfig, LedgerError, LedgerResult};

/// Remote ledger operations used by the batch pipeline.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetch account state, `None` if the account does not exist.
    async fn account(&self, address: Address) -> LedgerResult<Option<AccountInfo>>;

    /// Authoritative next sequence for `address`.
    async fn sequence(&self, address: Address) -> LedgerResult<u64> {
        self.account(address)
            .await?
            .map(|info| info.sequence)
            .ok_or(LedgerError::AccountNotFound(address))
    }

    /// Submit one signed transaction.
    async fn broadcast(&self, tx: &[u8]) -> LedgerResult<BroadcastAck>;
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    tx: String,
    mode: &'a str,
}

/// HTTP/JSON ledger client.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: Url,
    config: LedgerConfig,
    timeout_duration: Duration,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// No request is made here; an unreachable endpoint surfaces on first use.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let mut base_url: Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = %config.chain_id,
            "Ledger client initialized"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    fn endpoint(&self, path: &str) -> LedgerResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LedgerError::Rpc(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn with_timeout<T, F>(&self, fut: F) -> LedgerResult<T>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    async fn error_body(&self, response: reqwest::Response) -> LedgerError {
        let status = response.status().as_u16();
        let body = self
            .with_timeout(response.text())
            .await
            .unwrap_or_default();
        LedgerError::Http { status, body }
    }
}

/// Body read failures are decode errors; timeouts stay timeouts.
fn into_decode_error(error: LedgerError) -> LedgerError {
    match error {
        LedgerError::Rpc(message) => LedgerError::Decode(message),
        other => other,
    }
}

#[async_trait]
impl Ledger for LedgerClient {
    async fn account(&self, address: Address) -> LedgerResult<Option<AccountInfo>> {
        let url = self.endpoint(&format!("auth/accounts/{}", address))?;
        let response = self.with_timeout(self.http.get(url).send()).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let info: AccountInfo = self
                    .with_timeout(response.json())
                    .await
                    .map_err(into_decode_error)?;
                Ok(Some(info))
            }
            _ => Err(self.error_body(response).await),
        }
    }

    async fn broadcast(&self, tx: &[u8]) -> LedgerResult<BroadcastAck> {
        let url = self.endpoint("txs")?;
        let body = BroadcastRequest {
            tx: alloy::hex::encode_prefixed(tx),
            mode: "sync",
        };
        let response = self
            .with_timeout(self.http.post(url).json(&body).send())
            .await?;

        if !response.status().is_success() {
            return Err(self.error_body(response).await);
        }

        let ack: BroadcastAck = self
            .with_timeout(response.json())
            .await
            .map_err(into_decode_error)?;
        if ack.code != 0 {
            return Err(LedgerError::Rejected {
                code: ack.code,
                log: ack.log,
            });
        }
        Ok(ack)
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
