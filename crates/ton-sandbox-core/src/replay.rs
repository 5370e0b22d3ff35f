//! Sequential replay of the transactions that precede the target in its
//! block.
//!
//! The account state fetched for a snapshot is the one at the end of the
//! previous masterchain block. Every earlier transaction of the account in
//! the target's block has to be re-applied, in order, before the target sees
//! the state it saw on chain.

use serde::Serialize;
use ton_replay_types::{ProgressSink, ReplayError, Result, StateCodec, TxHash};
use ton_state_fetcher::ReplaySnapshot;

use crate::config::HashMismatchPolicy;
use crate::emulator::{EmulationRequest, TransactionEmulator, Verbosity};

/// Outcome of re-applying one prior transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStep {
    pub lt: u64,
    pub hash: TxHash,
    /// Base64 `ShardAccount` after the step.
    pub resulting_account: String,
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub resulting_balance: u128,
    /// Whether the emulated new-state hash equals the chain-recorded one.
    pub hash_match: bool,
}

/// State after all prior transactions, ready for the target run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayOutcome {
    pub steps: Vec<ReplayStep>,
    /// Base64 `ShardAccount` the target is applied to.
    pub account: String,
    /// Balance before the target.
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub balance: u128,
}

impl ReplayOutcome {
    /// Whether every replayed step reproduced the recorded state.
    pub fn verified(&self) -> bool {
        self.steps.iter().all(|step| step.hash_match)
    }
}

pub struct SequentialReplayer<'a> {
    emulator: &'a dyn TransactionEmulator,
    codec: &'a dyn StateCodec,
    policy: HashMismatchPolicy,
}

impl<'a> SequentialReplayer<'a> {
    pub fn new(
        emulator: &'a dyn TransactionEmulator,
        codec: &'a dyn StateCodec,
        policy: HashMismatchPolicy,
    ) -> Self {
        Self {
            emulator,
            codec,
            policy,
        }
    }

    pub async fn replay(
        &self,
        snapshot: &ReplaySnapshot,
        libraries: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<ReplayOutcome> {
        // the emulator has not seen the account's previous transaction
        let mut account = self
            .codec
            .encode_shard_account(&snapshot.account.with_cleared_last_transaction())?;
        let mut balance = snapshot.account.balance;
        let mut steps = Vec::with_capacity(snapshot.prior_transactions.len());

        progress.phase("Emulating");
        let total = snapshot.prior_transactions.len();
        for (index, tx) in snapshot.prior_transactions.iter().enumerate() {
            progress.phase(&format!("Emulating {}/{}", index + 1, total));

            let failed = |e: ReplayError| ReplayError::ReplayFailed {
                lt: tx.lt,
                reason: e.to_string(),
            };

            let request =
                EmulationRequest::for_transaction(&snapshot.block, libraries, &account, tx, Verbosity::Short)
                    .map_err(failed)?;
            let response = self.emulator.emulate(request).await.map_err(failed)?;
            let (next_account, emulated_tx) = match response.outputs() {
                Ok(outputs) => outputs,
                Err(reason) => {
                    tracing::debug!(lt = tx.lt, logs = %response.logs, "prior transaction failed");
                    return Err(ReplayError::ReplayFailed { lt: tx.lt, reason });
                }
            };

            let emulated = self.codec.decode_transaction(emulated_tx).map_err(failed)?;
            let hash_match = emulated.state_update.new_hash == tx.state_update.new_hash;
            if !hash_match {
                tracing::warn!(
                    lt = tx.lt,
                    expected = %hex::encode(tx.state_update.new_hash),
                    actual = %hex::encode(emulated.state_update.new_hash),
                    "replayed state differs from the chain"
                );
                if self.policy == HashMismatchPolicy::Abort {
                    return Err(ReplayError::ReplayFailed {
                        lt: tx.lt,
                        reason: "resulting state hash does not match the chain".to_string(),
                    });
                }
            }

            account = next_account.to_string();
            balance = self
                .codec
                .decode_shard_account(&account)
                .map_err(failed)?
                .balance
                .unwrap_or(0);
            tracing::info!(lt = tx.lt, balance, hash_match, "prior transaction replayed");

            steps.push(ReplayStep {
                lt: tx.lt,
                hash: tx.hash,
                resulting_account: account.clone(),
                resulting_balance: balance,
                hash_match,
            });
        }

        Ok(ReplayOutcome {
            steps,
            account,
            balance,
        })
    }
}
