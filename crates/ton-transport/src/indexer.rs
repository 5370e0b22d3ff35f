//! toncenter v3 indexer client: transaction lookup by hash and the block
//! index (shard block -> masterchain anchor).

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Clone)]
pub struct IndexerClient {
    endpoint: String,
    agent: ureq::Agent,
    api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V3Transaction {
    /// Raw form, e.g. `0:DAE153A7...`.
    pub account: String,
    /// Standard base64.
    pub hash: String,
    pub lt: String,
    #[serde(default)]
    pub now: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct V3Transactions {
    transactions: Vec<V3Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V3BlockRef {
    pub workchain: i32,
    pub shard: String,
    pub seqno: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V3Block {
    pub workchain: i32,
    pub shard: String,
    pub seqno: u32,
    /// Standard base64.
    pub root_hash: String,
    pub file_hash: String,
    /// Standard base64.
    pub rand_seed: String,
    pub masterchain_block_ref: V3BlockRef,
}

#[derive(Debug, Clone, Deserialize)]
struct V3Blocks {
    blocks: Vec<V3Block>,
}

/// Signed decimal shard id (as v4 reports it) to the `0x...` unsigned hex
/// form the v3 index expects.
pub fn shard_to_hex(shard: &str) -> Result<String> {
    let signed: i64 = shard
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid shard id '{}': {}", shard, e))?;
    Ok(format!("0x{:x}", signed as u64))
}

impl IndexerClient {
    pub fn mainnet() -> Self {
        Self::new("https://toncenter.com/api/v3", None)
    }

    pub fn testnet() -> Self {
        Self::new("https://testnet.toncenter.com/api/v3", None)
    }

    pub fn new(endpoint: &str, api_key: Option<String>) -> Self {
        Self::with_agent(endpoint, api_key, ureq::AgentBuilder::new().build())
    }

    pub fn with_agent(endpoint: &str, api_key: Option<String>, agent: ureq::Agent) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!(url = %url, ?params, "toncenter v3 request");
        let mut request = self.agent.get(&url);
        for (key, value) in params {
            request = request.query(key, value);
        }
        if let Some(key) = &self.api_key {
            request = request.set("X-API-Key", key);
        }
        request
            .call()
            .map_err(|e| anyhow!("v3 request {} failed: {}", path, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse v3 response for {}: {}", path, e))
    }

    /// Look a transaction up by hash (hex or base64). Returns `None` when
    /// the index does not know it.
    pub fn transaction_by_hash(&self, hash: &str) -> Result<Option<V3Transaction>> {
        let page: V3Transactions = self.get("/transactions", &[("hash", hash), ("limit", "1")])?;
        Ok(page.transactions.into_iter().next())
    }

    /// Shard block by `(workchain, shard, seqno)`; `shard` is the decimal
    /// signed id.
    pub fn block(&self, workchain: i32, shard: &str, seqno: u32) -> Result<Option<V3Block>> {
        let workchain = workchain.to_string();
        let shard = shard_to_hex(shard)?;
        let seqno = seqno.to_string();
        let page: V3Blocks = self.get(
            "/blocks",
            &[
                ("workchain", workchain.as_str()),
                ("shard", shard.as_str()),
                ("seqno", seqno.as_str()),
            ],
        )?;
        Ok(page.blocks.into_iter().next())
    }
}
