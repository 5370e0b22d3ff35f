//! Upstream collaborators of the snapshot builder.
//!
//! Each trait is one service family. Implementations fetch and decode; they
//! never cache. Failures are reported as
//! [`ReplayError::UpstreamUnavailable`](ton_replay_types::ReplayError).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ton_replay_types::{AccountSnapshot, Result, StdAddress, TransactionIdentity, TxHash};

/// Shard block that contains a transaction, as the block data service
/// reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBlockRef {
    pub workchain: i32,
    /// Signed decimal shard id.
    pub shard: String,
    pub seqno: u32,
    pub root_hash: [u8; 32],
    pub file_hash: [u8; 32],
}

/// What the block index knows about a shard block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAnchor {
    /// Root hash according to the index; must equal the block data
    /// service's.
    pub root_hash: [u8; 32],
    /// Masterchain block that committed the shard block.
    pub mc_seqno: u32,
    pub random_seed: [u8; 32],
}

/// One transaction listed in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTransaction {
    pub address: StdAddress,
    pub lt: u64,
    pub hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSummary {
    pub workchain: i32,
    pub shard: String,
    pub seqno: u32,
    pub transactions: Vec<BlockTransaction>,
}

/// A masterchain block with its shard set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterchainBlock {
    /// Seqno of the masterchain block itself (the first entry of the shard
    /// set).
    pub seqno: u32,
    pub shards: Vec<ShardSummary>,
}

impl MasterchainBlock {
    /// Transactions of `address` across all shards.
    pub fn transactions_of<'a>(
        &'a self,
        address: &'a StdAddress,
    ) -> impl Iterator<Item = &'a BlockTransaction> + 'a {
        self.shards
            .iter()
            .flat_map(|shard| shard.transactions.iter())
            .filter(move |tx| tx.address == *address)
    }
}

/// Block contents, config and account state (tonhub v4 in production).
#[async_trait::async_trait]
pub trait BlockDataSource: Send + Sync {
    async fn transaction_block(&self, identity: &TransactionIdentity) -> Result<ShardBlockRef>;

    async fn masterchain_block(&self, seqno: u32) -> Result<MasterchainBlock>;

    /// Base64 bag of cells of the config dictionary as of `mc_seqno`.
    async fn config(&self, mc_seqno: u32) -> Result<String>;

    async fn account_state(&self, mc_seqno: u32, address: &StdAddress) -> Result<AccountSnapshot>;
}

/// Shard block to masterchain anchoring (toncenter v3 in production).
#[async_trait::async_trait]
pub trait BlockIndex: Send + Sync {
    async fn anchor(&self, block: &ShardBlockRef) -> Result<BlockAnchor>;
}

/// Archival transaction history (toncenter v2 in production).
#[async_trait::async_trait]
pub trait TransactionArchive: Send + Sync {
    /// Encoded transactions of `address`, newest first, starting at
    /// `(start_lt, start_hash)` inclusive and stopping before `to_lt`.
    async fn transactions(
        &self,
        address: &StdAddress,
        start_lt: u64,
        start_hash: &TxHash,
        to_lt: u64,
    ) -> Result<Vec<String>>;
}

/// Library cell lookup by hash (toncenter v2 in production).
#[async_trait::async_trait]
pub trait LibraryDirectory: Send + Sync {
    /// `(hash, base64 code)` for each hash the directory knows.
    async fn libraries(&self, hashes: &[[u8; 32]]) -> Result<Vec<([u8; 32], String)>>;
}

/// The four collaborators, bundled.
#[derive(Clone)]
pub struct SnapshotSources {
    pub block_data: Arc<dyn BlockDataSource>,
    pub index: Arc<dyn BlockIndex>,
    pub archive: Arc<dyn TransactionArchive>,
    pub libraries: Arc<dyn LibraryDirectory>,
}

impl SnapshotSources {
    /// All four roles served by one object.
    pub fn from_single<S>(source: Arc<S>) -> Self
    where
        S: BlockDataSource + BlockIndex + TransactionArchive + LibraryDirectory + 'static,
    {
        Self {
            block_data: source.clone(),
            index: source.clone(),
            archive: source.clone(),
            libraries: source,
        }
    }
}
