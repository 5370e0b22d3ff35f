#![allow(dead_code)]
//! In-memory collaborators for snapshot builder tests.
//!
//! [`FixtureCodec`] stands in for the bag-of-cells codec: transactions are
//! JSON-encoded [`TransactionRecord`]s and code cells are written as
//! `code:<hex hash>,<hex hash>` listing the libraries they reference.

use std::collections::HashMap;
use std::sync::Mutex;

use ton_replay_types::{
    AccountSnapshot, ComputePhaseRecord, ContractState, ExecutedCompute, LibraryTable,
    MessageInfo, MessageRecord, MsgAddress, ReplayError, Result, ShardAccountSummary,
    StateCodec, StateUpdate, StdAddress, StorageStats, TransactionDescription,
    TransactionIdentity, TransactionRecord, TxHash,
};
use ton_state_fetcher::{
    BlockAnchor, BlockDataSource, BlockIndex, BlockTransaction, LibraryDirectory,
    MasterchainBlock, ShardBlockRef, ShardSummary, TransactionArchive,
};

pub const ACCOUNT: &str = "EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_";
pub const MC_SEQNO: u32 = 38_000_000;

pub fn address() -> StdAddress {
    ACCOUNT.parse().unwrap()
}

pub fn code_with_libraries(hashes: &[[u8; 32]]) -> String {
    let list: Vec<String> = hashes.iter().map(hex::encode).collect();
    format!("code:{}", list.join(","))
}

// =============================================================================
// Fixture codec
// =============================================================================

pub struct FixtureCodec;

impl StateCodec for FixtureCodec {
    fn decode_transaction(&self, boc: &str) -> Result<TransactionRecord> {
        serde_json::from_str(boc).map_err(|e| ReplayError::codec("transaction", e))
    }

    fn encode_shard_account(&self, account: &AccountSnapshot) -> Result<String> {
        let (lt, hash) = account.last_transaction.unwrap_or((0, TxHash::ZERO));
        Ok(format!("{}:{}:{}", account.balance, lt, hash.to_hex()))
    }

    fn decode_shard_account(&self, boc: &str) -> Result<ShardAccountSummary> {
        let mut parts = boc.split(':');
        let bad = || ReplayError::codec("ShardAccount", boc);
        let balance = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let lt = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let hash = parts.next().map(TxHash::parse).ok_or_else(bad)??;
        Ok(ShardAccountSummary {
            balance: Some(balance),
            last_transaction_lt: lt,
            last_transaction_hash: hash,
        })
    }

    fn library_refs(&self, code_boc: &str) -> Result<Vec<[u8; 32]>> {
        let Some(list) = code_boc.strip_prefix("code:") else {
            return Ok(vec![]);
        };
        list.split(',')
            .filter(|item| !item.is_empty())
            .map(|item| TxHash::parse(item).map(|hash| hash.0))
            .collect()
    }

    fn encode_libraries(&self, libraries: &LibraryTable) -> Result<Option<String>> {
        if libraries.is_empty() {
            return Ok(None);
        }
        let list: Vec<String> = libraries.iter().map(|(hash, _)| hex::encode(hash)).collect();
        Ok(Some(format!("libs:{}", list.join(","))))
    }
}

// =============================================================================
// Records
// =============================================================================

pub fn transaction(lt: u64, hash_byte: u8) -> TransactionRecord {
    TransactionRecord {
        lt,
        hash: TxHash([hash_byte; 32]),
        account: address().hash,
        now: 1_719_000_000,
        state_update: StateUpdate {
            old_hash: [hash_byte.wrapping_sub(1); 32],
            new_hash: [hash_byte; 32],
        },
        in_msg: Some(MessageRecord {
            boc: format!("msg-{}", lt),
            info: MessageInfo::Internal {
                src: MsgAddress::Std(StdAddress::new(0, [0x55; 32])),
                dst: MsgAddress::Std(address()),
                value: 1_000_000_000,
            },
            init_code: None,
        }),
        out_msgs: vec![],
        total_fees: 3_000_000,
        description: TransactionDescription::Ordinary {
            compute: ComputePhaseRecord::Executed(ExecutedCompute {
                success: true,
                exit_code: 0,
                vm_steps: 50,
                gas_used: 3_000,
                gas_fees: 1_200_000,
            }),
            action: None,
            aborted: false,
        },
        boc: format!("tx-{}", lt),
    }
}

pub fn encode(record: &TransactionRecord) -> String {
    serde_json::to_string(record).unwrap()
}

pub fn account(code: Option<String>) -> AccountSnapshot {
    AccountSnapshot {
        address: address(),
        balance: 5_000_000_000,
        state: ContractState::Active { code, data: None },
        storage: StorageStats::default(),
        storage_last_lt: 47_670_701_000_001,
        last_transaction: Some((47_670_701_000_001, TxHash([0x11; 32]))),
    }
}

// =============================================================================
// Sources
// =============================================================================

/// One block's worth of canned upstream answers, with a call log.
pub struct InMemorySources {
    pub shard_block: ShardBlockRef,
    pub anchor: BlockAnchor,
    pub block: MasterchainBlock,
    pub config: String,
    pub account: AccountSnapshot,
    /// Encoded transactions, newest first.
    pub history: Vec<String>,
    pub libraries: HashMap<[u8; 32], String>,
    pub calls: Mutex<Vec<String>>,
}

impl InMemorySources {
    /// A block holding `records` for the account; the target is the one
    /// whose lt is given.
    pub fn with_history(records: &[TransactionRecord]) -> Self {
        let shard_block = ShardBlockRef {
            workchain: 0,
            shard: "-9223372036854775808".into(),
            seqno: 45_000_000,
            root_hash: [0xaa; 32],
            file_hash: [0xbb; 32],
        };
        let mut newest_first = records.to_vec();
        newest_first.sort_by_key(|tx| std::cmp::Reverse(tx.lt));
        Self {
            anchor: BlockAnchor {
                root_hash: shard_block.root_hash,
                mc_seqno: MC_SEQNO,
                random_seed: [0x42; 32],
            },
            block: MasterchainBlock {
                seqno: MC_SEQNO,
                shards: vec![ShardSummary {
                    workchain: 0,
                    shard: shard_block.shard.clone(),
                    seqno: shard_block.seqno,
                    transactions: records
                        .iter()
                        .map(|tx| BlockTransaction {
                            address: address(),
                            lt: tx.lt,
                            hash: tx.hash,
                        })
                        .collect(),
                }],
            },
            shard_block,
            config: "config-boc".into(),
            account: account(None),
            history: newest_first.iter().map(encode).collect(),
            libraries: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BlockDataSource for InMemorySources {
    async fn transaction_block(&self, identity: &TransactionIdentity) -> Result<ShardBlockRef> {
        self.log(format!("transaction_block {}", identity.lt));
        Ok(self.shard_block.clone())
    }

    async fn masterchain_block(&self, seqno: u32) -> Result<MasterchainBlock> {
        self.log(format!("masterchain_block {}", seqno));
        Ok(self.block.clone())
    }

    async fn config(&self, mc_seqno: u32) -> Result<String> {
        self.log(format!("config {}", mc_seqno));
        Ok(self.config.clone())
    }

    async fn account_state(&self, mc_seqno: u32, _address: &StdAddress) -> Result<AccountSnapshot> {
        self.log(format!("account_state {}", mc_seqno));
        Ok(self.account.clone())
    }
}

#[async_trait::async_trait]
impl BlockIndex for InMemorySources {
    async fn anchor(&self, block: &ShardBlockRef) -> Result<BlockAnchor> {
        self.log(format!("anchor {}", block.seqno));
        Ok(self.anchor.clone())
    }
}

#[async_trait::async_trait]
impl TransactionArchive for InMemorySources {
    async fn transactions(
        &self,
        _address: &StdAddress,
        start_lt: u64,
        _start_hash: &TxHash,
        to_lt: u64,
    ) -> Result<Vec<String>> {
        self.log(format!("transactions {}..{}", to_lt, start_lt));
        Ok(self.history.clone())
    }
}

#[async_trait::async_trait]
impl LibraryDirectory for InMemorySources {
    async fn libraries(&self, hashes: &[[u8; 32]]) -> Result<Vec<([u8; 32], String)>> {
        self.log(format!("libraries {}", hashes.len()));
        Ok(hashes
            .iter()
            .filter_map(|hash| self.libraries.get(hash).map(|code| (*hash, code.clone())))
            .collect())
    }
}
