//! Client for the tonhub v4 HTTP API.
//!
//! ## Endpoints used
//! - `GET /account/{address}/tx/{lt}/{hash}`: transactions plus the shard
//!   blocks they were included in
//! - `GET /block/{seqno}`: a masterchain block with its shard set and the
//!   transactions of every shard block
//! - `GET /block/{seqno}/config`: blockchain config as of that block
//! - `GET /block/{seqno}/{address}`: account state as of that block
//!
//! ## Usage
//!
//! ```ignore
//! let client = TonhubClient::mainnet();
//! let block = client.block(38_000_000)?;
//! ```

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::network::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};

/// Blocking client for a v4 endpoint.
#[derive(Clone)]
pub struct TonhubClient {
    endpoint: String,
    agent: ureq::Agent,
}

/// Shard block reference attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V4BlockRef {
    pub workchain: i32,
    pub seqno: u32,
    /// Signed 64-bit shard id in decimal, e.g. `-9223372036854775808`.
    pub shard: String,
    /// Base64.
    pub root_hash: String,
    /// Base64.
    pub file_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4AccountTransactions {
    pub blocks: Vec<V4BlockRef>,
    /// Multi-root bag of cells holding the transactions.
    pub boc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V4ShortTransaction {
    /// Address in user-friendly form.
    pub account: String,
    pub lt: String,
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V4Shard {
    pub workchain: i32,
    pub seqno: u32,
    pub shard: String,
    pub root_hash: String,
    pub file_hash: String,
    #[serde(default)]
    pub transactions: Vec<V4ShortTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4BlockBody {
    pub shards: Vec<V4Shard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4Block {
    pub exist: bool,
    pub block: Option<V4BlockBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4ConfigCell {
    /// Base64 bag of cells of the config dictionary.
    pub cell: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4Config {
    pub config: V4ConfigCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum V4AccountState {
    Uninit,
    Active {
        code: Option<String>,
        data: Option<String>,
    },
    Frozen {
        #[serde(rename = "stateHash")]
        state_hash: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V4Balance {
    pub coins: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V4LastTransaction {
    pub lt: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V4StorageUsed {
    pub bits: u64,
    pub cells: u64,
    pub public_cells: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V4StorageStat {
    pub last_paid: u32,
    pub due_payment: Option<String>,
    pub used: V4StorageUsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V4Account {
    pub state: V4AccountState,
    pub balance: V4Balance,
    pub last: Option<V4LastTransaction>,
    pub storage_stat: Option<V4StorageStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V4AccountResponse {
    pub account: V4Account,
}

impl TonhubClient {
    pub fn mainnet() -> Self {
        Self::new("https://mainnet-v4.tonhubapi.com")
    }

    pub fn testnet() -> Self {
        Self::new("https://sandbox-v4.tonhubapi.com")
    }

    pub fn new(endpoint: &str) -> Self {
        Self::with_agent(
            endpoint,
            ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .timeout_connect(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
                .build(),
        )
    }

    pub fn with_agent(endpoint: &str, agent: ureq::Agent) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!(url = %url, "v4 request");
        self.agent
            .get(&url)
            .call()
            .map_err(|e| anyhow!("v4 request {} failed: {}", path, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse v4 response for {}: {}", path, e))
    }

    /// Transactions of `address` starting at `(lt, hash)` and going back,
    /// together with the shard blocks that contain them (same order).
    ///
    /// `hash` is URL-safe base64.
    pub fn account_transactions(
        &self,
        address: &str,
        lt: u64,
        hash: &str,
    ) -> Result<V4AccountTransactions> {
        self.get(&format!("/account/{}/tx/{}/{}", address, lt, hash))
    }

    pub fn block(&self, seqno: u32) -> Result<V4Block> {
        self.get(&format!("/block/{}", seqno))
    }

    pub fn config(&self, seqno: u32) -> Result<V4Config> {
        self.get(&format!("/block/{}/config", seqno))
    }

    pub fn account(&self, seqno: u32, address: &str) -> Result<V4AccountResponse> {
        self.get(&format!("/block/{}/{}", seqno, address))
    }
}
