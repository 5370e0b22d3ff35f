#![allow(dead_code)]
//! Test doubles for driving the replay engine without network or emulator.
//!
//! - [`FixtureCodec`]: transactions are JSON [`TransactionRecord`]s, shard
//!   accounts are `<balance>:<last lt>:<last hash hex>`
//! - [`BlockFixture`]: canned answers for all snapshot sources
//! - [`ScriptedEmulator`]: answers each request from a per-lt script and
//!   records what it was asked

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ton_replay_types::{
    AccountSnapshot, ActionPhaseRecord, ComputePhaseRecord, ContractState, ExecutedCompute,
    LibraryTable, MessageInfo, MessageRecord, MsgAddress, Network, ReplayError, Result,
    ShardAccountSummary, StateCodec, StateUpdate, StdAddress, StorageStats,
    TransactionDescription, TransactionIdentity, TransactionRecord, TxHash,
};
use ton_resolver::TransactionLookup;
use ton_sandbox_core::{
    EmulationRequest, EmulationResponse, HashMismatchPolicy, ReplayEngine, TransactionEmulator,
    Verbosity,
};
use ton_state_fetcher::{
    BlockAnchor, BlockDataSource, BlockIndex, BlockTransaction, LibraryDirectory,
    MasterchainBlock, ShardBlockRef, ShardSummary, SnapshotSources, TransactionArchive,
};

pub const ACCOUNT: &str = "EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_";
pub const INITIAL_BALANCE: u128 = 5_000_000_000;

pub fn address() -> StdAddress {
    ACCOUNT.parse().unwrap()
}

pub fn sender() -> StdAddress {
    StdAddress::new(0, [0x55; 32])
}

// =============================================================================
// Fixture codec
// =============================================================================

pub struct FixtureCodec;

pub fn shard_account(balance: u128, lt: u64, hash: TxHash) -> String {
    format!("{}:{}:{}", balance, lt, hash.to_hex())
}

impl StateCodec for FixtureCodec {
    fn decode_transaction(&self, boc: &str) -> Result<TransactionRecord> {
        serde_json::from_str(boc).map_err(|e| ReplayError::codec("transaction", e))
    }

    fn encode_shard_account(&self, account: &AccountSnapshot) -> Result<String> {
        let (lt, hash) = account.last_transaction.unwrap_or((0, TxHash::ZERO));
        Ok(shard_account(account.balance, lt, hash))
    }

    fn decode_shard_account(&self, boc: &str) -> Result<ShardAccountSummary> {
        let parts: Vec<&str> = boc.split(':').collect();
        let [balance, lt, hash] = parts.as_slice() else {
            return Err(ReplayError::codec("ShardAccount", boc));
        };
        Ok(ShardAccountSummary {
            balance: Some(balance.parse().map_err(|_| ReplayError::codec("ShardAccount", boc))?),
            last_transaction_lt: lt.parse().map_err(|_| ReplayError::codec("ShardAccount", boc))?,
            last_transaction_hash: TxHash::parse(hash)?,
        })
    }

    fn library_refs(&self, _code_boc: &str) -> Result<Vec<[u8; 32]>> {
        Ok(vec![])
    }

    fn encode_libraries(&self, libraries: &LibraryTable) -> Result<Option<String>> {
        Ok((!libraries.is_empty()).then(|| format!("libs:{}", libraries.len())))
    }
}

// =============================================================================
// Records
// =============================================================================

pub fn message(lt: u64, value: u128) -> MessageRecord {
    MessageRecord {
        boc: format!("msg-{}", lt),
        info: MessageInfo::Internal {
            src: MsgAddress::Std(sender()),
            dst: MsgAddress::Std(address()),
            value,
        },
        init_code: None,
    }
}

pub fn executed(exit_code: i32, vm_steps: u32) -> ComputePhaseRecord {
    ComputePhaseRecord::Executed(ExecutedCompute {
        success: exit_code == 0,
        exit_code,
        vm_steps,
        gas_used: 2_500,
        gas_fees: 1_000_000,
    })
}

/// On-chain record of the transaction at `lt`, whose resulting state hash is
/// `[lt as u8; 32]`.
pub fn chain_tx(lt: u64) -> TransactionRecord {
    TransactionRecord {
        lt,
        hash: TxHash([lt as u8; 32]),
        account: address().hash,
        now: 1_719_000_000 + lt as u32,
        state_update: StateUpdate {
            old_hash: [(lt as u8).wrapping_sub(1); 32],
            new_hash: [lt as u8; 32],
        },
        in_msg: Some(message(lt, 1_000_000_000)),
        out_msgs: vec![],
        total_fees: 3_000_000,
        description: TransactionDescription::Ordinary {
            compute: executed(0, 4),
            action: Some(ActionPhaseRecord {
                success: true,
                result_code: 0,
            }),
            aborted: false,
        },
        boc: format!("tx-{}", lt),
    }
}

pub fn identity(lt: u64) -> TransactionIdentity {
    TransactionIdentity::new(lt, TxHash([lt as u8; 32]), address())
}

// =============================================================================
// Snapshot sources
// =============================================================================

pub struct BlockFixture {
    pub records: Vec<TransactionRecord>,
    pub account: AccountSnapshot,
}

impl BlockFixture {
    pub fn new(lts: &[u64]) -> Self {
        Self {
            records: lts.iter().copied().map(chain_tx).collect(),
            account: AccountSnapshot {
                address: address(),
                balance: INITIAL_BALANCE,
                state: ContractState::Active {
                    code: Some("code".into()),
                    data: Some("data".into()),
                },
                storage: StorageStats::default(),
                storage_last_lt: 7,
                last_transaction: Some((7, TxHash([7; 32]))),
            },
        }
    }

    fn shard_block() -> ShardBlockRef {
        ShardBlockRef {
            workchain: 0,
            shard: "-9223372036854775808".into(),
            seqno: 45_000_000,
            root_hash: [0xaa; 32],
            file_hash: [0xbb; 32],
        }
    }
}

#[async_trait::async_trait]
impl BlockDataSource for BlockFixture {
    async fn transaction_block(&self, _identity: &TransactionIdentity) -> Result<ShardBlockRef> {
        Ok(Self::shard_block())
    }

    async fn masterchain_block(&self, seqno: u32) -> Result<MasterchainBlock> {
        Ok(MasterchainBlock {
            seqno,
            shards: vec![ShardSummary {
                workchain: 0,
                shard: Self::shard_block().shard,
                seqno: 45_000_000,
                transactions: self
                    .records
                    .iter()
                    .map(|tx| BlockTransaction {
                        address: address(),
                        lt: tx.lt,
                        hash: tx.hash,
                    })
                    .collect(),
            }],
        })
    }

    async fn config(&self, _mc_seqno: u32) -> Result<String> {
        Ok("config".into())
    }

    async fn account_state(&self, _mc_seqno: u32, _address: &StdAddress) -> Result<AccountSnapshot> {
        Ok(self.account.clone())
    }
}

#[async_trait::async_trait]
impl BlockIndex for BlockFixture {
    async fn anchor(&self, block: &ShardBlockRef) -> Result<BlockAnchor> {
        Ok(BlockAnchor {
            root_hash: block.root_hash,
            mc_seqno: 38_000_000,
            random_seed: [0x42; 32],
        })
    }
}

#[async_trait::async_trait]
impl TransactionArchive for BlockFixture {
    async fn transactions(
        &self,
        _address: &StdAddress,
        start_lt: u64,
        _start_hash: &TxHash,
        to_lt: u64,
    ) -> Result<Vec<String>> {
        let mut found: Vec<&TransactionRecord> = self
            .records
            .iter()
            .filter(|tx| tx.lt <= start_lt && tx.lt > to_lt)
            .collect();
        found.sort_by_key(|tx| std::cmp::Reverse(tx.lt));
        Ok(found.into_iter().map(|tx| serde_json::to_string(tx).unwrap()).collect())
    }
}

#[async_trait::async_trait]
impl LibraryDirectory for BlockFixture {
    async fn libraries(&self, _hashes: &[[u8; 32]]) -> Result<Vec<([u8; 32], String)>> {
        Ok(vec![])
    }
}

/// Lookup that knows exactly the fixture's transactions.
pub struct FixtureLookup {
    pub known: Vec<TransactionIdentity>,
}

#[async_trait::async_trait]
impl TransactionLookup for FixtureLookup {
    async fn lookup(&self, hash: &TxHash) -> Result<Option<TransactionIdentity>> {
        Ok(self.known.iter().find(|id| id.hash == *hash).copied())
    }
}

// =============================================================================
// Scripted emulator
// =============================================================================

/// What the emulator does for one lt.
#[derive(Clone)]
pub struct Script {
    pub tx: TransactionRecord,
    pub balance_after: u128,
    pub fail_untraced: bool,
    pub fail_traced: bool,
    pub vm_log: String,
}

impl Script {
    /// Reproduces the chain record exactly.
    pub fn faithful(lt: u64, balance_after: u128) -> Self {
        Self {
            tx: chain_tx(lt),
            balance_after,
            fail_untraced: false,
            fail_traced: false,
            vm_log: String::new(),
        }
    }

    /// Ends in a state the chain does not know.
    pub fn diverging(lt: u64, balance_after: u128) -> Self {
        let mut script = Self::faithful(lt, balance_after);
        script.tx.state_update.new_hash = [0xee; 32];
        script
    }
}

#[derive(Default)]
pub struct ScriptedEmulator {
    pub scripts: HashMap<u64, Script>,
    pub requests: Mutex<Vec<EmulationRequest>>,
}

impl ScriptedEmulator {
    pub fn with(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: scripts.into_iter().map(|s| (s.tx.lt, s)).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EmulationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TransactionEmulator for ScriptedEmulator {
    async fn emulate(&self, request: EmulationRequest) -> Result<EmulationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .get(&request.lt)
            .ok_or_else(|| ReplayError::Emulator(format!("no script for lt {}", request.lt)))?;

        let traced = request.verbosity == Verbosity::FullLocationStackVerbose;
        let fail = if traced { script.fail_traced } else { script.fail_untraced };
        if fail {
            return Ok(EmulationResponse {
                success: false,
                error: Some(format!("scripted failure at lt {}", request.lt)),
                ..Default::default()
            });
        }

        Ok(EmulationResponse {
            success: true,
            shard_account: Some(shard_account(script.balance_after, script.tx.lt, script.tx.hash)),
            transaction: Some(serde_json::to_string(&script.tx).unwrap()),
            logs: format!("executor log for {}", request.lt),
            vm_log: if traced { script.vm_log.clone() } else { String::new() },
            error: None,
        })
    }
}

// =============================================================================
// Engine
// =============================================================================

pub fn engine(
    block: BlockFixture,
    emulator: Arc<ScriptedEmulator>,
    policy: HashMismatchPolicy,
) -> ReplayEngine {
    let known = block.records.iter().map(|tx| identity(tx.lt)).collect();
    ReplayEngine::new(
        Network::Mainnet,
        Arc::new(FixtureLookup { known }),
        SnapshotSources::from_single(Arc::new(block)),
        emulator,
        Arc::new(FixtureCodec),
        policy,
    )
}
