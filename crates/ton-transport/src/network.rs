//! Endpoint selection and shared HTTP settings.

use std::time::Duration;

use ton_replay_types::env_utils::{env_duration_ms, env_duration_secs, env_string};
use ton_replay_types::Network;

const MAINNET_V4: &str = "https://mainnet-v4.tonhubapi.com";
const TESTNET_V4: &str = "https://sandbox-v4.tonhubapi.com";
const MAINNET_TONCENTER_V2: &str = "https://toncenter.com/api/v2/jsonRPC";
const TESTNET_TONCENTER_V2: &str = "https://testnet.toncenter.com/api/v2/jsonRPC";
const MAINNET_TONCENTER_V3: &str = "https://toncenter.com/api/v3";
const TESTNET_TONCENTER_V3: &str = "https://testnet.toncenter.com/api/v3";

/// Default request timeout in seconds (`TON_REPLAY_TIMEOUT_SECS`).
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
/// Default connect timeout in seconds (`TON_REPLAY_CONNECT_TIMEOUT_SECS`).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default pause between dependent requests (`TON_REPLAY_REQUEST_DELAY_MS`).
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

pub fn infer_network_from_url(url: &str) -> Network {
    let lower = url.to_lowercase();
    if lower.contains("testnet") || lower.contains("sandbox") {
        Network::Testnet
    } else {
        Network::Mainnet
    }
}

/// Base URLs of the three upstream services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// tonhub v4 HTTP API (blocks, config, account state).
    pub v4: String,
    /// toncenter v2 JSON-RPC (archival transactions, libraries).
    pub toncenter_v2: String,
    /// toncenter v3 indexer (lookup by hash, block index).
    pub toncenter_v3: String,
}

impl Endpoints {
    /// Built-in endpoints for a network.
    pub fn defaults(network: Network) -> Self {
        match network {
            Network::Mainnet => Self {
                v4: MAINNET_V4.to_string(),
                toncenter_v2: MAINNET_TONCENTER_V2.to_string(),
                toncenter_v3: MAINNET_TONCENTER_V3.to_string(),
            },
            Network::Testnet => Self {
                v4: TESTNET_V4.to_string(),
                toncenter_v2: TESTNET_TONCENTER_V2.to_string(),
                toncenter_v3: TESTNET_TONCENTER_V3.to_string(),
            },
        }
    }

    /// Defaults with `TON_V4_ENDPOINT`, `TONCENTER_V2_ENDPOINT` and
    /// `TONCENTER_V3_ENDPOINT` applied on top.
    pub fn resolve(network: Network) -> Self {
        let defaults = Self::defaults(network);
        Self {
            v4: env_string("TON_V4_ENDPOINT").unwrap_or(defaults.v4),
            toncenter_v2: env_string("TONCENTER_V2_ENDPOINT").unwrap_or(defaults.toncenter_v2),
            toncenter_v3: env_string("TONCENTER_V3_ENDPOINT").unwrap_or(defaults.toncenter_v3),
        }
    }
}

/// Everything needed to build the three clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub network: Network,
    pub endpoints: Endpoints,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sent as `X-API-Key` to toncenter when present.
    pub api_key: Option<String>,
    pub request_delay: Duration,
}

impl TransportConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            endpoints: Endpoints::defaults(network),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            api_key: None,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }

    /// Network defaults overridden from the environment.
    pub fn from_env(network: Network) -> Self {
        Self {
            network,
            endpoints: Endpoints::resolve(network),
            timeout: env_duration_secs("TON_REPLAY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            connect_timeout: env_duration_secs(
                "TON_REPLAY_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
            api_key: env_string("TONCENTER_API_KEY"),
            request_delay: env_duration_ms("TON_REPLAY_REQUEST_DELAY_MS", DEFAULT_REQUEST_DELAY_MS),
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn build_agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .timeout_connect(self.connect_timeout)
            .build()
    }
}
