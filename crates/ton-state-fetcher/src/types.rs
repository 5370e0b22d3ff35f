use ton_replay_types::{AccountSnapshot, LibraryTable, TransactionIdentity, TransactionRecord};

use crate::source::ShardBlockRef;

/// Block-level inputs shared by every emulation of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockConfig {
    /// Base64 bag of cells of the config dictionary.
    pub config_boc: String,
    pub random_seed: [u8; 32],
    /// Masterchain block that committed the target's shard block.
    pub mc_seqno: u32,
    pub shard_block: ShardBlockRef,
}

/// Everything needed to replay up to and including one transaction.
///
/// Built once per report by [`crate::SnapshotBuilder`]; consumers read it
/// and clone what they need.
#[derive(Debug, Clone)]
pub struct ReplaySnapshot {
    pub identity: TransactionIdentity,
    pub target: TransactionRecord,
    /// Transactions of the account in the same masterchain block that precede
    /// the target, oldest first.
    pub prior_transactions: Vec<TransactionRecord>,
    /// Account state as of the previous masterchain block.
    pub account: AccountSnapshot,
    pub block: BlockConfig,
    pub libraries: LibraryTable,
    /// Whether no later transaction of the account exists in the block. The
    /// on-chain balance after the block only matches the replay when true.
    pub is_last_in_block: bool,
    /// Lowest lt of the account's transactions in the block.
    pub min_lt: u64,
}

impl ReplaySnapshot {
    /// Number of emulations the full replay performs (priors plus the two
    /// target runs).
    pub fn emulation_count(&self) -> usize {
        self.prior_transactions.len() + 2
    }
}
