//! Account pre-state as fetched from the block data service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::StdAddress;
use crate::identity::TxHash;

/// Contract state of an account at a point in time.
///
/// Code and data are base64-encoded bags of cells, exactly as upstream
/// returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContractState {
    Uninit,
    Frozen {
        state_hash: [u8; 32],
    },
    Active {
        code: Option<String>,
        data: Option<String>,
    },
}

impl ContractState {
    pub fn code(&self) -> Option<&str> {
        match self {
            ContractState::Active { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// `StorageInfo` counters carried into the encoded shard account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub cells: u64,
    pub bits: u64,
    pub public_cells: u64,
    pub last_paid: u32,
    #[serde(with = "crate::serde_utils::coins_opt")]
    pub due_payment: Option<u128>,
}

/// Pre-block state of the replayed account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: StdAddress,
    #[serde(with = "crate::serde_utils::coins")]
    pub balance: u128,
    pub state: ContractState,
    pub storage: StorageStats,
    /// `AccountStorage.last_trans_lt`. Survives clearing of the
    /// shard-account pointer below.
    pub storage_last_lt: u64,
    /// `(lt, hash)` of the last transaction applied to this state, if any.
    pub last_transaction: Option<(u64, TxHash)>,
}

impl AccountSnapshot {
    /// Copy with the last-transaction pointer reset to the zero sentinel.
    ///
    /// The emulator has no record of transactions that precede its first
    /// input, so the first shard account it sees must not point at one.
    pub fn with_cleared_last_transaction(&self) -> Self {
        Self {
            last_transaction: None,
            ..self.clone()
        }
    }

    pub fn last_transaction_lt(&self) -> u64 {
        self.last_transaction.map(|(lt, _)| lt).unwrap_or(0)
    }
}

/// Summary of an encoded shard account, as the replayer needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardAccountSummary {
    /// `None` for `account_none`.
    pub balance: Option<u128>,
    pub last_transaction_lt: u64,
    pub last_transaction_hash: TxHash,
}

/// Library cells referenced by the account, keyed by representation hash.
///
/// Values are base64 bags of cells holding the library code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryTable {
    entries: BTreeMap<[u8; 32], String>,
}

impl LibraryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: [u8; 32], code_boc: String) {
        self.entries.insert(hash, code_boc);
    }

    pub fn contains(&self, hash: &[u8; 32]) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn get(&self, hash: &[u8; 32]) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8; 32], &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }
}
