//! Network transport layer for TON data services.
//!
//! Three upstream services feed the replay engine:
//!
//! - [`TonhubClient`]: tonhub v4 HTTP API (block contents, config, account
//!   state at a block)
//! - [`ToncenterClient`]: toncenter v2 JSON-RPC (archival transaction
//!   history, library cells)
//! - [`IndexerClient`]: toncenter v3 indexer (transaction lookup by hash,
//!   shard block to masterchain anchoring)
//!
//! All clients are blocking (`ureq`); async callers wrap them in
//! `tokio::task::spawn_blocking`. [`RequestPacer`] spaces consecutive calls.
//!
//! ```ignore
//! use ton_transport::{TransportClients, TransportConfig};
//! use ton_replay_types::Network;
//!
//! let clients = TransportClients::from_config(&TransportConfig::from_env(Network::Mainnet));
//! let tx = clients.indexer.transaction_by_hash("3e5f4979...")?;
//! ```

pub mod indexer;
pub mod network;
pub mod pacing;
pub mod toncenter;
pub mod tonhub;

pub use indexer::{shard_to_hex, IndexerClient, V3Block, V3Transaction};
pub use network::{infer_network_from_url, Endpoints, TransportConfig};
pub use pacing::RequestPacer;
pub use toncenter::{ToncenterClient, TransactionsQuery, V2LibraryEntry, V2Transaction};
pub use tonhub::{
    TonhubClient, V4Account, V4AccountState, V4AccountTransactions, V4Block, V4BlockRef, V4Config,
};

/// The three clients, sharing one configured agent.
#[derive(Clone)]
pub struct TransportClients {
    pub tonhub: TonhubClient,
    pub toncenter: ToncenterClient,
    pub indexer: IndexerClient,
}

impl TransportClients {
    pub fn from_config(config: &TransportConfig) -> Self {
        let agent = config.build_agent();
        Self {
            tonhub: TonhubClient::with_agent(&config.endpoints.v4, agent.clone()),
            toncenter: ToncenterClient::with_agent(
                &config.endpoints.toncenter_v2,
                config.api_key.clone(),
                agent.clone(),
            ),
            indexer: IndexerClient::with_agent(
                &config.endpoints.toncenter_v3,
                config.api_key.clone(),
                agent,
            ),
        }
    }
}
