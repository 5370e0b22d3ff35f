//! toncenter v2 JSON-RPC client.
//!
//! Only two methods are needed: `getTransactions` (with `archival: true`,
//! so that old blocks are served from archive nodes) and `getLibraries`.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Upper bound toncenter accepts for `getTransactions`.
pub const MAX_TRANSACTIONS_PER_CALL: u32 = 1000;

#[derive(Clone)]
pub struct ToncenterClient {
    endpoint: String,
    agent: ureq::Agent,
    api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V2TransactionId {
    pub lt: String,
    /// Standard base64.
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Transaction {
    pub transaction_id: V2TransactionId,
    pub utime: u64,
    /// Base64 bag of cells of the full transaction.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct V2LibraryEntry {
    pub hash: String,
    /// Base64 bag of cells of the library code.
    pub data: String,
}

/// Parameters of an archival `getTransactions` call.
#[derive(Debug, Clone)]
pub struct TransactionsQuery {
    pub address: String,
    /// Start from this transaction (inclusive) and go back.
    pub lt: u64,
    /// Standard base64 hash of the starting transaction.
    pub hash: String,
    /// Stop before reaching this lt (exclusive).
    pub to_lt: u64,
    pub limit: u32,
}

impl ToncenterClient {
    pub fn mainnet() -> Self {
        Self::new("https://toncenter.com/api/v2/jsonRPC", None)
    }

    pub fn testnet() -> Self {
        Self::new("https://testnet.toncenter.com/api/v2/jsonRPC", None)
    }

    pub fn new(endpoint: &str, api_key: Option<String>) -> Self {
        Self::with_agent(endpoint, api_key, ureq::AgentBuilder::new().build())
    }

    pub fn with_agent(endpoint: &str, api_key: Option<String>, agent: ureq::Agent) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one JSON-RPC call and return its `result`.
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "id": "1",
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        tracing::debug!(method, "toncenter v2 request");

        let mut request = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.set("X-API-Key", key);
        }

        let response: Value = match request.send_json(&body) {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| anyhow!("Failed to parse {} response: {}", method, e))?,
            // toncenter reports RPC failures with a non-2xx status and a JSON body
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                return Err(anyhow!("{} failed with HTTP {}: {}", method, code, text));
            }
            Err(e) => return Err(anyhow!("{} request failed: {}", method, e)),
        };

        extract_result(method, response)
    }

    pub fn get_transactions(&self, query: &TransactionsQuery) -> Result<Vec<V2Transaction>> {
        let result = self.call(
            "getTransactions",
            json!({
                "address": query.address,
                "limit": query.limit.min(MAX_TRANSACTIONS_PER_CALL),
                "lt": query.lt.to_string(),
                "hash": query.hash,
                "to_lt": query.to_lt.to_string(),
                "archival": true,
            }),
        )?;
        serde_json::from_value(result)
            .map_err(|e| anyhow!("Unexpected getTransactions payload: {}", e))
    }

    /// Fetch library cells by hash (hex or base64).
    pub fn get_libraries(&self, hashes: &[String]) -> Result<Vec<V2LibraryEntry>> {
        let result = self.call("getLibraries", json!({ "libraries": hashes }))?;
        let entries = result
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("getLibraries response has no result list"))?;
        serde_json::from_value(entries)
            .map_err(|e| anyhow!("Unexpected getLibraries payload: {}", e))
    }
}

fn extract_result(method: &str, response: Value) -> Result<Value> {
    if response.get("ok").and_then(|ok| ok.as_bool()) == Some(false) {
        let msg = response
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown error");
        return Err(anyhow!("{} error: {}", method, msg));
    }
    response
        .get("result")
        .cloned()
        .ok_or_else(|| anyhow!("No result in {} response", method))
}
