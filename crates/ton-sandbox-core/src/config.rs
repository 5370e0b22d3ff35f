//! Engine settings.
//!
//! Every setting has a built-in default and an environment override; the
//! CLI applies its flags on top of [`EngineConfig::from_env`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ton_replay_types::env_utils::{env_string, env_var};
use ton_replay_types::{Network, ReplayError};
use ton_transport::TransportConfig;

/// `TON_EMULATOR_BIN`: path to the emulator bridge executable.
pub const EMULATOR_BIN_ENV: &str = "TON_EMULATOR_BIN";
/// `TON_REPLAY_ON_HASH_MISMATCH`: `continue` or `abort`.
pub const HASH_MISMATCH_ENV: &str = "TON_REPLAY_ON_HASH_MISMATCH";

/// What to do when a replayed prior transaction ends in a different state
/// than the chain recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMismatchPolicy {
    /// Warn and carry the emulator's state forward.
    #[default]
    Continue,
    /// Fail with `ReplayFailed`.
    Abort,
}

impl fmt::Display for HashMismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashMismatchPolicy::Continue => write!(f, "continue"),
            HashMismatchPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for HashMismatchPolicy {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(HashMismatchPolicy::Continue),
            "abort" => Ok(HashMismatchPolicy::Abort),
            other => Err(ReplayError::codec(
                "hash mismatch policy",
                format!("expected 'continue' or 'abort', got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub transport: TransportConfig,
    pub emulator_bin: Option<PathBuf>,
    pub on_hash_mismatch: HashMismatchPolicy,
}

impl EngineConfig {
    /// Built-in defaults only; the environment is not consulted.
    pub fn new(network: Network) -> Self {
        Self {
            transport: TransportConfig::new(network),
            emulator_bin: None,
            on_hash_mismatch: HashMismatchPolicy::default(),
        }
    }

    pub fn from_env(network: Network) -> Self {
        let on_hash_mismatch = match env_string(HASH_MISMATCH_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring {}", HASH_MISMATCH_ENV);
                HashMismatchPolicy::default()
            }),
            None => HashMismatchPolicy::default(),
        };
        Self {
            transport: TransportConfig::from_env(network),
            emulator_bin: env_var::<PathBuf>(EMULATOR_BIN_ENV),
            on_hash_mismatch,
        }
    }

    pub fn network(&self) -> Network {
        self.transport.network
    }

    pub fn with_emulator_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.emulator_bin = Some(path.into());
        self
    }

    pub fn with_hash_mismatch_policy(mut self, policy: HashMismatchPolicy) -> Self {
        self.on_hash_mismatch = policy;
        self
    }
}
