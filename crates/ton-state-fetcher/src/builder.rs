//! Assembles a [`ReplaySnapshot`] from the upstream collaborators.

use std::sync::Arc;

use ton_replay_types::{
    LibraryTable, ProgressSink, ReplayError, Result, StateCodec, TransactionIdentity,
    TransactionRecord,
};

use crate::libraries::{fetch_libraries, referenced_libraries};
use crate::source::{MasterchainBlock, SnapshotSources};
use crate::types::{BlockConfig, ReplaySnapshot};

/// Lower lt bound of the account's transactions in `block`, and whether the
/// target is the last of them.
///
/// The target's own lt always takes part, so a block listing that omits the
/// account still yields a usable bound.
pub fn block_bounds(block: &MasterchainBlock, identity: &TransactionIdentity) -> (u64, bool) {
    let mut min_lt = identity.lt;
    let mut is_last = true;
    for tx in block.transactions_of(&identity.address) {
        min_lt = min_lt.min(tx.lt);
        if tx.lt > identity.lt {
            is_last = false;
        }
    }
    (min_lt, is_last)
}

/// Split archive records into the target and its predecessors, oldest
/// first.
pub fn split_history(
    identity: &TransactionIdentity,
    mut records: Vec<TransactionRecord>,
) -> Result<(TransactionRecord, Vec<TransactionRecord>)> {
    let position = records
        .iter()
        .position(|tx| tx.hash == identity.hash)
        .ok_or_else(|| {
            ReplayError::upstream(
                "transaction archive",
                format!("transaction {} missing from account history", identity),
            )
        })?;
    let target = records.swap_remove(position);

    let mut prior: Vec<TransactionRecord> = records
        .into_iter()
        .filter(|tx| tx.lt < target.lt)
        .collect();
    prior.sort_by_key(|tx| tx.lt);
    Ok((target, prior))
}

pub struct SnapshotBuilder {
    sources: SnapshotSources,
    codec: Arc<dyn StateCodec>,
}

impl SnapshotBuilder {
    pub fn new(sources: SnapshotSources, codec: Arc<dyn StateCodec>) -> Self {
        Self { sources, codec }
    }

    pub async fn build(
        &self,
        identity: &TransactionIdentity,
        progress: &dyn ProgressSink,
    ) -> Result<ReplaySnapshot> {
        progress.phase("Getting the tx");
        let shard_block = self.sources.block_data.transaction_block(identity).await?;
        tracing::debug!(
            workchain = shard_block.workchain,
            shard = %shard_block.shard,
            seqno = shard_block.seqno,
            "transaction block located"
        );

        let anchor = self.sources.index.anchor(&shard_block).await?;
        if anchor.root_hash != shard_block.root_hash {
            return Err(ReplayError::BlockIntegrityError {
                workchain: shard_block.workchain,
                shard: shard_block.shard.clone(),
                seqno: shard_block.seqno,
                expected: hex::encode(shard_block.root_hash),
                actual: hex::encode(anchor.root_hash),
            });
        }

        let mc_block = self
            .sources
            .block_data
            .masterchain_block(anchor.mc_seqno)
            .await?;
        let (min_lt, is_last_in_block) = block_bounds(&mc_block, identity);
        tracing::debug!(mc_seqno = mc_block.seqno, min_lt, is_last_in_block, "block bounds");

        progress.phase("Getting previous txs");
        let encoded = self
            .sources
            .archive
            .transactions(
                &identity.address,
                identity.lt,
                &identity.hash,
                min_lt.saturating_sub(1),
            )
            .await?;
        let records = encoded
            .iter()
            .map(|boc| self.codec.decode_transaction(boc))
            .collect::<Result<Vec<_>>>()?;
        let (target, prior_transactions) = split_history(identity, records)?;
        tracing::debug!(prior = prior_transactions.len(), "history assembled");

        progress.phase("Getting blockchain config");
        let config_boc = self.sources.block_data.config(mc_block.seqno).await?;

        progress.phase("Getting account state");
        let state_seqno = mc_block.seqno.checked_sub(1).ok_or_else(|| {
            ReplayError::upstream("block data", "masterchain block 0 has no predecessor")
        })?;
        let account = self
            .sources
            .block_data
            .account_state(state_seqno, &identity.address)
            .await?;

        let code_cells = account
            .state
            .code()
            .into_iter()
            .chain(target.in_msg.as_ref().and_then(|msg| msg.init_code.as_deref()));
        let wanted = referenced_libraries(self.codec.as_ref(), code_cells)?;
        let mut libraries = LibraryTable::new();
        if !wanted.is_empty() {
            progress.phase("Getting libs");
            fetch_libraries(self.sources.libraries.as_ref(), &wanted, &mut libraries).await?;
        }

        Ok(ReplaySnapshot {
            identity: *identity,
            target,
            prior_transactions,
            account,
            block: BlockConfig {
                config_boc,
                random_seed: anchor.random_seed,
                mc_seqno: mc_block.seqno,
                shard_block,
            },
            libraries,
            is_last_in_block,
            min_lt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BlockTransaction, ShardSummary};
    use ton_replay_types::{
        ComputePhaseRecord, StateUpdate, StdAddress, TransactionDescription, TxHash,
    };

    fn record(lt: u64, hash: u8) -> TransactionRecord {
        TransactionRecord {
            lt,
            hash: TxHash([hash; 32]),
            account: [1u8; 32],
            now: 1_700_000_000,
            state_update: StateUpdate {
                old_hash: [0u8; 32],
                new_hash: [0u8; 32],
            },
            in_msg: None,
            out_msgs: vec![],
            total_fees: 0,
            description: TransactionDescription::Ordinary {
                compute: ComputePhaseRecord::Skipped {
                    reason: "no_state".into(),
                },
                action: None,
                aborted: false,
            },
            boc: String::new(),
        }
    }

    fn identity(lt: u64, hash: u8) -> TransactionIdentity {
        TransactionIdentity::new(lt, TxHash([hash; 32]), StdAddress::new(0, [1u8; 32]))
    }

    #[test]
    fn test_split_history_orders_priors() {
        let records = vec![record(30, 3), record(10, 1), record(20, 2)];
        let (target, prior) = split_history(&identity(30, 3), records).unwrap();
        assert_eq!(target.lt, 30);
        let lts: Vec<u64> = prior.iter().map(|tx| tx.lt).collect();
        assert_eq!(lts, vec![10, 20]);
    }

    #[test]
    fn test_split_history_without_target() {
        let err = split_history(&identity(30, 3), vec![record(10, 1)]).unwrap_err();
        assert!(matches!(err, ReplayError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_block_bounds() {
        let me = StdAddress::new(0, [1u8; 32]);
        let other = StdAddress::new(0, [2u8; 32]);
        let tx = |address, lt| BlockTransaction {
            address,
            lt,
            hash: TxHash([0u8; 32]),
        };
        let block = MasterchainBlock {
            seqno: 100,
            shards: vec![ShardSummary {
                workchain: 0,
                shard: "-9223372036854775808".into(),
                seqno: 7,
                transactions: vec![tx(me, 12), tx(other, 5), tx(me, 15), tx(me, 20)],
            }],
        };
        assert_eq!(block_bounds(&block, &identity(15, 0)), (12, false));
        assert_eq!(block_bounds(&block, &identity(20, 0)), (12, true));
        // target not listed at all
        assert_eq!(block_bounds(&block, &identity(9, 0)), (9, false));
    }
}
