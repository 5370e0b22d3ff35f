use serde::Serialize;
use ton_replay_types::{StdAddress, TransactionIdentity};
use ton_resolver::TxLinks;

use crate::trace::TraceEntry;

/// Coin movement around the target transaction, in nanotons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoneyFlow {
    /// Account balance right before the target.
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub balance_before: u128,
    /// Value of all outbound internal messages.
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub sent_total: u128,
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub total_fees: u128,
    #[serde(with = "ton_replay_types::serde_utils::coins")]
    pub balance_after: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeInfo {
    Skipped,
    Executed {
        success: bool,
        /// The action phase result code when the VM itself exited with 0.
        exit_code: i32,
        vm_steps: u32,
        gas_used: u64,
        #[serde(with = "ton_replay_types::serde_utils::coins")]
        gas_fees: u128,
    },
}

impl ComputeInfo {
    pub fn vm_steps(&self) -> Option<u32> {
        match self {
            ComputeInfo::Skipped => None,
            ComputeInfo::Executed { vm_steps, .. } => Some(*vm_steps),
        }
    }
}

/// Final result of replaying one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmulationReport {
    pub identity: TransactionIdentity,
    /// `None` for messages without a source (external inbound).
    pub sender: Option<StdAddress>,
    pub contract: StdAddress,
    /// Value of the inbound message when it is internal.
    #[serde(with = "ton_replay_types::serde_utils::coins_opt")]
    pub amount: Option<u128>,
    pub utime: u32,
    pub lt: u64,
    pub money: MoneyFlow,
    pub compute_info: ComputeInfo,
    pub compute_logs: Vec<TraceEntry>,
    /// Whether the replayed state matches the one recorded on chain.
    pub state_update_hash_ok: bool,
    pub executor_logs: String,
    pub links: TxLinks,
}
