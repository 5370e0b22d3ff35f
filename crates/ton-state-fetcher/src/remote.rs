//! Production sources backed by the public TON HTTP APIs.
//!
//! The transport clients are blocking; every call runs on the blocking pool
//! after waiting for its service family's [`RequestPacer`].

use std::sync::Arc;

use ton_replay_types::encoding::decode_bytes32;
use ton_replay_types::{
    AccountSnapshot, ContractState, ReplayError, Result, StdAddress, StorageStats,
    TransactionIdentity, TxHash,
};
use ton_transport::toncenter::MAX_TRANSACTIONS_PER_CALL;
use ton_transport::tonhub::V4Shard;
use ton_transport::{
    RequestPacer, TransactionsQuery, TransportClients, TransportConfig, V4Account,
    V4AccountState, V4BlockRef,
};

use crate::source::{
    BlockAnchor, BlockDataSource, BlockIndex, BlockTransaction, LibraryDirectory,
    MasterchainBlock, ShardBlockRef, ShardSummary, SnapshotSources, TransactionArchive,
};

const V4: &str = "tonhub v4";
const V2: &str = "toncenter v2";
const V3: &str = "toncenter v3";

/// Run a blocking transport call off the async runtime.
async fn blocking<T, F>(service: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ReplayError::upstream(service, format!("request task failed: {}", e)))?
        .map_err(|e| ReplayError::upstream(service, e))
}

fn parse_u64(service: &str, field: &str, text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| ReplayError::upstream(service, format!("bad {} '{}'", field, text)))
}

fn parse_u128(service: &str, field: &str, text: &str) -> Result<u128> {
    text.trim()
        .parse()
        .map_err(|_| ReplayError::upstream(service, format!("bad {} '{}'", field, text)))
}

fn bytes32(service: &str, text: &str, what: &str) -> Result<[u8; 32]> {
    decode_bytes32(text, what).map_err(|e| ReplayError::upstream(service, e))
}

// =============================================================================
// v4 payload conversion
// =============================================================================

pub(crate) fn shard_block_ref(block: &V4BlockRef) -> Result<ShardBlockRef> {
    Ok(ShardBlockRef {
        workchain: block.workchain,
        shard: block.shard.clone(),
        seqno: block.seqno,
        root_hash: bytes32(V4, &block.root_hash, "root hash")?,
        file_hash: bytes32(V4, &block.file_hash, "file hash")?,
    })
}

pub(crate) fn shard_summary(shard: &V4Shard) -> Result<ShardSummary> {
    let transactions = shard
        .transactions
        .iter()
        .map(|tx| {
            Ok(BlockTransaction {
                address: tx
                    .account
                    .parse()
                    .map_err(|e| ReplayError::upstream(V4, e))?,
                lt: parse_u64(V4, "lt", &tx.lt)?,
                hash: TxHash(bytes32(V4, &tx.hash, "transaction hash")?),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ShardSummary {
        workchain: shard.workchain,
        shard: shard.shard.clone(),
        seqno: shard.seqno,
        transactions,
    })
}

pub(crate) fn account_snapshot(address: StdAddress, account: &V4Account) -> Result<AccountSnapshot> {
    let state = match &account.state {
        V4AccountState::Uninit => ContractState::Uninit,
        V4AccountState::Active { code, data } => ContractState::Active {
            code: code.clone(),
            data: data.clone(),
        },
        V4AccountState::Frozen { state_hash } => ContractState::Frozen {
            state_hash: bytes32(V4, state_hash, "frozen state hash")?,
        },
    };

    let storage = match &account.storage_stat {
        Some(stat) => StorageStats {
            cells: stat.used.cells,
            bits: stat.used.bits,
            public_cells: stat.used.public_cells,
            last_paid: stat.last_paid,
            due_payment: stat
                .due_payment
                .as_deref()
                .map(|due| parse_u128(V4, "due payment", due))
                .transpose()?,
        },
        None => StorageStats::default(),
    };

    let last_transaction = account
        .last
        .as_ref()
        .map(|last| -> Result<(u64, TxHash)> {
            Ok((
                parse_u64(V4, "last lt", &last.lt)?,
                TxHash(bytes32(V4, &last.hash, "last transaction hash")?),
            ))
        })
        .transpose()?;

    Ok(AccountSnapshot {
        address,
        balance: parse_u128(V4, "balance", &account.balance.coins)?,
        state,
        storage,
        storage_last_lt: last_transaction.map(|(lt, _)| lt).unwrap_or(0),
        last_transaction,
    })
}

// =============================================================================
// RemoteSources
// =============================================================================

/// All four snapshot collaborators over HTTP, one pacer per service.
pub struct RemoteSources {
    clients: TransportClients,
    v4_pacer: RequestPacer,
    v2_pacer: RequestPacer,
    v3_pacer: RequestPacer,
}

impl RemoteSources {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            clients: TransportClients::from_config(config),
            v4_pacer: RequestPacer::new(config.request_delay),
            v2_pacer: RequestPacer::new(config.request_delay),
            v3_pacer: RequestPacer::new(config.request_delay),
        }
    }

    /// Bundle as [`SnapshotSources`].
    pub fn into_sources(self) -> SnapshotSources {
        SnapshotSources::from_single(Arc::new(self))
    }
}

#[async_trait::async_trait]
impl BlockDataSource for RemoteSources {
    async fn transaction_block(&self, identity: &TransactionIdentity) -> Result<ShardBlockRef> {
        self.v4_pacer.pace().await;
        let client = self.clients.tonhub.clone();
        let address = identity.address.to_string();
        let (lt, hash) = (identity.lt, identity.hash.to_base64_url());
        let found = blocking(V4, move || client.account_transactions(&address, lt, &hash)).await?;
        let block = found.blocks.first().ok_or_else(|| {
            ReplayError::upstream(V4, format!("no block reported for transaction {}", identity))
        })?;
        shard_block_ref(block)
    }

    async fn masterchain_block(&self, seqno: u32) -> Result<MasterchainBlock> {
        self.v4_pacer.pace().await;
        let client = self.clients.tonhub.clone();
        let block = blocking(V4, move || client.block(seqno)).await?;
        let body = match block.block {
            Some(body) if block.exist => body,
            _ => return Err(ReplayError::upstream(V4, format!("masterchain block {} not found", seqno))),
        };
        let shards = body
            .shards
            .iter()
            .map(shard_summary)
            .collect::<Result<Vec<_>>>()?;
        let own_seqno = shards
            .first()
            .map(|shard| shard.seqno)
            .ok_or_else(|| ReplayError::upstream(V4, format!("block {} lists no shards", seqno)))?;
        Ok(MasterchainBlock {
            seqno: own_seqno,
            shards,
        })
    }

    async fn config(&self, mc_seqno: u32) -> Result<String> {
        self.v4_pacer.pace().await;
        let client = self.clients.tonhub.clone();
        let config = blocking(V4, move || client.config(mc_seqno)).await?;
        Ok(config.config.cell)
    }

    async fn account_state(&self, mc_seqno: u32, address: &StdAddress) -> Result<AccountSnapshot> {
        self.v4_pacer.pace().await;
        let client = self.clients.tonhub.clone();
        let rendered = address.to_string();
        let response = blocking(V4, move || client.account(mc_seqno, &rendered)).await?;
        account_snapshot(*address, &response.account)
    }
}

#[async_trait::async_trait]
impl BlockIndex for RemoteSources {
    async fn anchor(&self, block: &ShardBlockRef) -> Result<BlockAnchor> {
        self.v3_pacer.pace().await;
        let client = self.clients.indexer.clone();
        let (workchain, shard, seqno) = (block.workchain, block.shard.clone(), block.seqno);
        let found = blocking(V3, move || client.block(workchain, &shard, seqno))
            .await?
            .ok_or_else(|| {
                ReplayError::upstream(
                    V3,
                    format!("block {}:{}:{} is not indexed", block.workchain, block.shard, block.seqno),
                )
            })?;
        Ok(BlockAnchor {
            root_hash: bytes32(V3, &found.root_hash, "root hash")?,
            mc_seqno: found.masterchain_block_ref.seqno,
            random_seed: bytes32(V3, &found.rand_seed, "random seed")?,
        })
    }
}

#[async_trait::async_trait]
impl TransactionArchive for RemoteSources {
    async fn transactions(
        &self,
        address: &StdAddress,
        start_lt: u64,
        start_hash: &TxHash,
        to_lt: u64,
    ) -> Result<Vec<String>> {
        self.v2_pacer.pace().await;
        let client = self.clients.toncenter.clone();
        let query = TransactionsQuery {
            address: address.to_string(),
            lt: start_lt,
            hash: start_hash.to_base64(),
            to_lt,
            limit: MAX_TRANSACTIONS_PER_CALL,
        };
        let txs = blocking(V2, move || client.get_transactions(&query)).await?;
        if txs.len() as u32 >= MAX_TRANSACTIONS_PER_CALL {
            tracing::warn!(
                count = txs.len(),
                "archive returned a full page; older transactions of this block may be missing"
            );
        }
        Ok(txs.into_iter().map(|tx| tx.data).collect())
    }
}

#[async_trait::async_trait]
impl LibraryDirectory for RemoteSources {
    async fn libraries(&self, hashes: &[[u8; 32]]) -> Result<Vec<([u8; 32], String)>> {
        self.v2_pacer.pace().await;
        let client = self.clients.toncenter.clone();
        let requested: Vec<String> = hashes.iter().map(hex::encode).collect();
        let entries = blocking(V2, move || client.get_libraries(&requested)).await?;
        entries
            .into_iter()
            .map(|entry| Ok((bytes32(V2, &entry.hash, "library hash")?, entry.data)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_transport::tonhub::{V4Balance, V4LastTransaction, V4StorageStat, V4StorageUsed};

    fn v4_account() -> V4Account {
        V4Account {
            state: V4AccountState::Active {
                code: Some("code".into()),
                data: None,
            },
            balance: V4Balance {
                coins: "2500000000".into(),
            },
            last: Some(V4LastTransaction {
                lt: "47670702000001".into(),
                hash: "Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=".into(),
            }),
            storage_stat: Some(V4StorageStat {
                last_paid: 1_719_000_000,
                due_payment: Some("15".into()),
                used: V4StorageUsed {
                    bits: 900,
                    cells: 4,
                    public_cells: 0,
                },
            }),
        }
    }

    #[test]
    fn test_account_snapshot_conversion() {
        let address = StdAddress::new(0, [3u8; 32]);
        let snapshot = account_snapshot(address, &v4_account()).unwrap();
        assert_eq!(snapshot.balance, 2_500_000_000);
        assert_eq!(snapshot.state.code(), Some("code"));
        assert_eq!(snapshot.storage.due_payment, Some(15));
        assert_eq!(snapshot.storage.cells, 4);
        assert_eq!(snapshot.last_transaction_lt(), 47670702000001);
    }

    #[test]
    fn test_account_without_history() {
        let mut account = v4_account();
        account.last = None;
        account.storage_stat = None;
        account.state = V4AccountState::Uninit;
        let snapshot = account_snapshot(StdAddress::new(0, [3u8; 32]), &account).unwrap();
        assert_eq!(snapshot.last_transaction, None);
        assert_eq!(snapshot.storage, StorageStats::default());
        assert_eq!(snapshot.state, ContractState::Uninit);
    }

    #[test]
    fn test_bad_balance_is_upstream_error() {
        let mut account = v4_account();
        account.balance.coins = "lots".into();
        let err = account_snapshot(StdAddress::new(0, [3u8; 32]), &account).unwrap_err();
        assert!(matches!(err, ReplayError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_shard_block_ref_decodes_hashes() {
        let block = V4BlockRef {
            workchain: 0,
            seqno: 45_000_000,
            shard: "-9223372036854775808".into(),
            root_hash: "Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=".into(),
            file_hash: "Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=".into(),
        };
        let converted = shard_block_ref(&block).unwrap();
        assert_eq!(converted.root_hash[0], 0x3e);
        assert_eq!(converted.seqno, 45_000_000);
    }
}
