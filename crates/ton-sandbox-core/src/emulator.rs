//! The transaction emulator seam.
//!
//! The engine never executes TVM code itself. Each emulation is one
//! [`EmulationRequest`] handed to a [`TransactionEmulator`]; the production
//! implementation, [`ProcessEmulator`], pipes the request as JSON into an
//! external bridge binary and reads an [`EmulationResponse`] back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use ton_replay_types::{ReplayError, Result, TransactionRecord};
use ton_state_fetcher::BlockConfig;

/// How much the emulator writes to `vm_log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Short,
    /// One `execute` line and one `stack:` line per instruction.
    FullLocationStackVerbose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulationRequest {
    /// Base64 config dictionary.
    pub config: String,
    /// Base64 library dictionary, absent when no library is referenced.
    pub libraries: Option<String>,
    pub verbosity: Verbosity,
    /// Base64 `ShardAccount` the message is applied to.
    pub shard_account: String,
    /// Base64 inbound message.
    pub message: String,
    pub now: u32,
    pub lt: u64,
    /// Hex-encoded 32-byte block random seed.
    pub random_seed: String,
    pub ignore_chksig: bool,
    pub debug_enabled: bool,
}

impl EmulationRequest {
    /// Request that re-executes `tx` against `shard_account` under the
    /// block's parameters.
    pub fn for_transaction(
        block: &BlockConfig,
        libraries: Option<&str>,
        shard_account: &str,
        tx: &TransactionRecord,
        verbosity: Verbosity,
    ) -> Result<Self> {
        let message = tx.in_msg.as_ref().ok_or_else(|| {
            ReplayError::UnsupportedTransactionKind {
                kind: format!("transaction at lt {} without an inbound message", tx.lt),
            }
        })?;
        Ok(Self {
            config: block.config_boc.clone(),
            libraries: libraries.map(str::to_string),
            verbosity,
            shard_account: shard_account.to_string(),
            message: message.boc.clone(),
            now: tx.now,
            lt: tx.lt,
            random_seed: hex::encode(block.random_seed),
            ignore_chksig: false,
            debug_enabled: true,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulationResponse {
    pub success: bool,
    /// Base64 `ShardAccount` after the transaction.
    #[serde(default)]
    pub shard_account: Option<String>,
    /// Base64 transaction produced by the emulator.
    #[serde(default)]
    pub transaction: Option<String>,
    /// Executor log.
    #[serde(default)]
    pub logs: String,
    /// TVM log, at the requested verbosity.
    #[serde(default)]
    pub vm_log: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl EmulationResponse {
    /// `(shard_account, transaction)` of a successful run, or the reason the
    /// run is unusable.
    pub fn outputs(&self) -> std::result::Result<(&str, &str), String> {
        if !self.success {
            return Err(self
                .error
                .clone()
                .unwrap_or_else(|| "emulator reported failure".to_string()));
        }
        match (&self.shard_account, &self.transaction) {
            (Some(account), Some(tx)) => Ok((account.as_str(), tx.as_str())),
            _ => Err("successful response without shard account or transaction".to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait TransactionEmulator: Send + Sync {
    async fn emulate(&self, request: EmulationRequest) -> Result<EmulationResponse>;
}

/// Runs an external bridge binary once per request: JSON request on stdin,
/// JSON response on stdout.
#[derive(Debug, Clone)]
pub struct ProcessEmulator {
    binary: PathBuf,
}

impl ProcessEmulator {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

fn run_bridge(binary: &Path, request: &EmulationRequest) -> Result<EmulationResponse> {
    let payload =
        serde_json::to_vec(request).map_err(|e| ReplayError::Emulator(e.to_string()))?;

    let mut child = Command::new(binary)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReplayError::Emulator(format!("failed to start {}: {}", binary.display(), e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(&payload)
            .map_err(|e| ReplayError::Emulator(format!("failed to write request: {}", e)))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ReplayError::Emulator(format!("failed to wait for {}: {}", binary.display(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ReplayError::Emulator(format!(
            "{} exited with status {}: {}",
            binary.display(),
            output.status,
            stderr
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| ReplayError::Emulator(format!("unreadable response: {}", e)))
}

#[async_trait::async_trait]
impl TransactionEmulator for ProcessEmulator {
    async fn emulate(&self, request: EmulationRequest) -> Result<EmulationResponse> {
        tracing::debug!(lt = request.lt, verbosity = ?request.verbosity, "invoking emulator bridge");
        let binary = self.binary.clone();
        tokio::task::spawn_blocking(move || run_bridge(&binary, &request))
            .await
            .map_err(|e| ReplayError::Emulator(format!("emulator task failed: {}", e)))?
    }
}
