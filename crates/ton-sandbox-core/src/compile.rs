//! Turns the two target runs into an [`EmulationReport`].

use ton_replay_types::{
    AddressRole, ComputePhaseRecord, EmulationRun, MsgAddress, Network, ReplayError, Result,
    StateCodec, StdAddress, TransactionDescription, TransactionIdentity, TransactionRecord,
};
use ton_resolver::to_links;

use crate::emulator::EmulationResponse;
use crate::report::{ComputeInfo, EmulationReport, MoneyFlow};
use crate::trace::TraceEntry;

pub struct CompileInput<'a> {
    /// Run at `short` verbosity; its state and transaction are canonical.
    pub untraced: &'a EmulationResponse,
    /// Run at full verbosity, used only for the trace.
    pub traced: &'a EmulationResponse,
    /// The target as recorded on chain.
    pub target: &'a TransactionRecord,
    pub balance_before: u128,
    pub identity: &'a TransactionIdentity,
    pub network: Network,
    pub trace: Vec<TraceEntry>,
}

fn run_outputs<'r>(
    response: &'r EmulationResponse,
    run: EmulationRun,
    lt: u64,
) -> Result<(&'r str, &'r str)> {
    response.outputs().map_err(|reason| {
        tracing::debug!(%run, logs = %response.logs, "target emulation failed");
        ReplayError::EmulationFailed { run, lt, reason }
    })
}

fn source_address(src: &MsgAddress) -> Result<Option<StdAddress>> {
    match src {
        MsgAddress::None => Ok(None),
        MsgAddress::Std(address) => Ok(Some(*address)),
        other => Err(ReplayError::InvalidAddress {
            role: AddressRole::Source,
            value: other.to_string(),
        }),
    }
}

fn destination_address(dst: &MsgAddress) -> Result<StdAddress> {
    dst.as_std().copied().ok_or_else(|| ReplayError::InvalidAddress {
        role: AddressRole::Destination,
        value: dst.to_string(),
    })
}

fn compute_info(description: &TransactionDescription) -> Result<ComputeInfo> {
    let (compute, action) = match description {
        TransactionDescription::Ordinary { compute, action, .. } => (compute, action),
        TransactionDescription::Other { kind } => {
            return Err(ReplayError::UnsupportedTransactionKind { kind: kind.clone() })
        }
    };
    Ok(match compute {
        ComputePhaseRecord::Skipped { .. } => ComputeInfo::Skipped,
        ComputePhaseRecord::Executed(phase) => ComputeInfo::Executed {
            success: phase.success,
            exit_code: if phase.exit_code == 0 {
                action.map(|a| a.result_code).unwrap_or(0)
            } else {
                phase.exit_code
            },
            vm_steps: phase.vm_steps,
            gas_used: phase.gas_used,
            gas_fees: phase.gas_fees,
        },
    })
}

pub fn compile(input: CompileInput<'_>, codec: &dyn StateCodec) -> Result<EmulationReport> {
    let lt = input.target.lt;
    let (account_after, canonical_boc) = run_outputs(input.untraced, EmulationRun::Untraced, lt)?;
    let (_, traced_boc) = run_outputs(input.traced, EmulationRun::Traced, lt)?;

    let canonical = codec.decode_transaction(canonical_boc)?;
    let traced = codec.decode_transaction(traced_boc)?;

    if canonical.state_update.old_hash != traced.state_update.old_hash {
        tracing::warn!("traced and untraced runs started from different states");
    }

    let state_update_hash_ok =
        canonical.state_update.new_hash == input.target.state_update.new_hash;
    if state_update_hash_ok {
        tracing::info!("state update hash matches the chain");
    } else {
        tracing::warn!(
            expected = %hex::encode(input.target.state_update.new_hash),
            actual = %hex::encode(canonical.state_update.new_hash),
            "state update hash mismatch"
        );
    }

    let in_msg = canonical.in_msg.as_ref().ok_or_else(|| ReplayError::UnsupportedTransactionKind {
        kind: "transaction without an inbound message".to_string(),
    })?;
    let sender = source_address(in_msg.info.src())?;
    let contract = destination_address(in_msg.info.dst())?;

    let compute_info = compute_info(&canonical.description)?;
    if let Some(vm_steps) = compute_info.vm_steps() {
        let expected = vm_steps.saturating_sub(1) as usize;
        if input.trace.len() != expected {
            tracing::warn!(
                entries = input.trace.len(),
                vm_steps,
                "trace length does not match the reported step count"
            );
        }
    }

    let balance_after = codec
        .decode_shard_account(account_after)?
        .balance
        .unwrap_or(0);

    Ok(EmulationReport {
        identity: *input.identity,
        sender,
        contract,
        amount: in_msg.info.value(),
        utime: canonical.now,
        lt: canonical.lt,
        money: MoneyFlow {
            balance_before: input.balance_before,
            sent_total: canonical.sent_total(),
            total_fees: canonical.total_fees,
            balance_after,
        },
        compute_info,
        compute_logs: input.trace,
        state_update_hash_ok,
        executor_logs: input.untraced.logs.clone(),
        links: to_links(input.identity, input.network),
    })
}
