//! Bag-of-cells codec for the structures the replay pipeline touches.
//!
//! [`StateCodec`] is the seam between the pipeline and TL-B. The production
//! implementation, [`TlbCodec`], decodes transactions and messages through
//! the `everscale-types` models and writes shard accounts directly with the
//! cell builder:
//!
//! ```text
//! shard_account  account:^Account last_trans_hash:bits256 last_trans_lt:uint64
//! account_none$0
//! account$1      addr:MsgAddressInt storage_stat:StorageInfo storage:AccountStorage
//! storage_info   used:(cells bits public_cells : VarUInteger 7) last_paid:uint32
//!                due_payment:(Maybe Grams)
//! account_storage last_trans_lt:uint64 balance:CurrencyCollection state:AccountState
//! ```

use std::collections::HashSet;

use everscale_types::cell::{Cell, CellBuilder, CellSlice, DynCell, HashBytes};
use everscale_types::dict::Dict;
use everscale_types::models::{ComputePhase, IntAddr, MsgInfo, OwnedMessage, Transaction, TxInfo};
use everscale_types::prelude::Boc;

use crate::account::{AccountSnapshot, ContractState, LibraryTable, ShardAccountSummary};
use crate::encoding::base64_decode;
use crate::error::{ReplayError, Result};
use crate::identity::TxHash;
use crate::transaction::{
    ActionPhaseRecord, ComputePhaseRecord, ExecutedCompute, MessageInfo, MessageRecord,
    MsgAddress, StateUpdate, TransactionDescription, TransactionRecord,
};

/// Library cells are exotic cells of exactly this many bits: tag + hash.
const LIBRARY_CELL_BITS: u16 = 8 + 256;
const LIBRARY_CELL_TAG: u8 = 2;

pub trait StateCodec: Send + Sync {
    fn decode_transaction(&self, boc: &str) -> Result<TransactionRecord>;

    /// Encode a `ShardAccount` cell. The last-transaction pointer is taken
    /// from the snapshot as is; `None` becomes the zero sentinel.
    fn encode_shard_account(&self, account: &AccountSnapshot) -> Result<String>;

    fn decode_shard_account(&self, boc: &str) -> Result<ShardAccountSummary>;

    /// Hashes of library cells referenced anywhere in a code tree.
    fn library_refs(&self, code_boc: &str) -> Result<Vec<[u8; 32]>>;

    /// The `HashmapE 256 ^Cell` root handed to the emulator, or `None`
    /// when the table is empty.
    fn encode_libraries(&self, libraries: &LibraryTable) -> Result<Option<String>>;
}

/// [`StateCodec`] over real bags of cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct TlbCodec;

// =============================================================================
// Helpers
// =============================================================================

fn decode_cell(boc: &str, what: &str) -> Result<Cell> {
    Boc::decode_base64(boc.trim()).map_err(|e| ReplayError::codec(what, e))
}

fn tlb(what: &'static str) -> impl FnOnce(everscale_types::error::Error) -> ReplayError {
    move |e| ReplayError::codec(what, e)
}

fn store_var_uint(builder: &mut CellBuilder, value: u128, len_bits: u16) -> Result<()> {
    let bytes = value.to_be_bytes();
    let len = bytes.iter().position(|b| *b != 0).map(|i| 16 - i).unwrap_or(0);
    if len >= (1usize << len_bits) {
        return Err(ReplayError::codec(
            "VarUInteger",
            format!("{} does not fit {} length bits", value, len_bits),
        ));
    }
    builder
        .store_uint(len as u64, len_bits)
        .map_err(tlb("VarUInteger"))?;
    builder
        .store_raw(&bytes[16 - len..], (len * 8) as u16)
        .map_err(tlb("VarUInteger"))?;
    Ok(())
}

fn load_var_uint(slice: &mut CellSlice<'_>, len_bits: u16) -> Result<u128> {
    let len = slice.load_uint(len_bits).map_err(tlb("VarUInteger"))? as usize;
    let mut buf = [0u8; 16];
    if len > 0 {
        slice
            .load_raw(&mut buf[16 - len..], (len * 8) as u16)
            .map_err(tlb("VarUInteger"))?;
    }
    Ok(u128::from_be_bytes(buf))
}

fn msg_address(addr: &IntAddr) -> MsgAddress {
    match addr {
        IntAddr::Std(std) if std.anycast.is_none() => {
            MsgAddress::Std(crate::address::StdAddress::new(std.workchain, std.address.0))
        }
        IntAddr::Std(std) => MsgAddress::Var(std.to_string()),
        IntAddr::Var(var) => MsgAddress::Var(format!("{:?}", var)),
    }
}

fn decode_message(cell: &Cell) -> Result<MessageRecord> {
    let message = cell
        .parse::<OwnedMessage>()
        .map_err(tlb("message"))?;

    let info = match &message.info {
        MsgInfo::Int(info) => MessageInfo::Internal {
            src: msg_address(&info.src),
            dst: msg_address(&info.dst),
            value: info.value.tokens.into_inner(),
        },
        MsgInfo::ExtIn(info) => MessageInfo::ExternalIn {
            src: match &info.src {
                Some(ext) => MsgAddress::External(hex::encode(&ext.data)),
                None => MsgAddress::None,
            },
            dst: msg_address(&info.dst),
        },
        MsgInfo::ExtOut(info) => MessageInfo::ExternalOut {
            src: msg_address(&info.src),
            dst: match &info.dst {
                Some(ext) => MsgAddress::External(hex::encode(&ext.data)),
                None => MsgAddress::None,
            },
        },
    };

    let init_code = message
        .init
        .as_ref()
        .and_then(|init| init.code.as_ref())
        .map(|code| Boc::encode_base64(code));

    Ok(MessageRecord {
        boc: Boc::encode_base64(cell),
        info,
        init_code,
    })
}

fn decode_description(info: &TxInfo) -> TransactionDescription {
    match info {
        TxInfo::Ordinary(ordinary) => {
            let compute = match &ordinary.compute_phase {
                ComputePhase::Skipped(skipped) => ComputePhaseRecord::Skipped {
                    reason: format!("{:?}", skipped.reason),
                },
                ComputePhase::Executed(executed) => ComputePhaseRecord::Executed(ExecutedCompute {
                    success: executed.success,
                    exit_code: executed.exit_code,
                    vm_steps: executed.vm_steps,
                    gas_used: executed.gas_used.into_inner(),
                    gas_fees: executed.gas_fees.into_inner(),
                }),
            };
            let action = ordinary.action_phase.as_ref().map(|action| ActionPhaseRecord {
                success: action.success,
                result_code: action.result_code,
            });
            TransactionDescription::Ordinary {
                compute,
                action,
                aborted: ordinary.aborted,
            }
        }
        TxInfo::TickTock(_) => TransactionDescription::Other {
            kind: "tick_tock".to_string(),
        },
    }
}

fn collect_library_refs(cell: &DynCell, seen: &mut HashSet<HashBytes>, out: &mut Vec<[u8; 32]>) {
    if !seen.insert(*cell.repr_hash()) {
        return;
    }
    let data = cell.data();
    if cell.descriptor().is_exotic()
        && cell.bit_len() == LIBRARY_CELL_BITS
        && data.first() == Some(&LIBRARY_CELL_TAG)
    {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data[1..33]);
        out.push(hash);
        return;
    }
    for child in cell.references() {
        collect_library_refs(child, seen, out);
    }
}

// =============================================================================
// StateCodec
// =============================================================================

impl StateCodec for TlbCodec {
    fn decode_transaction(&self, boc: &str) -> Result<TransactionRecord> {
        let cell = decode_cell(boc, "transaction")?;
        let tx = cell
            .parse::<Transaction>()
            .map_err(tlb("transaction"))?;
        let state_update = tx.state_update.load().map_err(tlb("HASH_UPDATE"))?;
        let info = tx.info.load().map_err(tlb("transaction description"))?;

        let in_msg = tx.in_msg.as_ref().map(decode_message).transpose()?;
        let mut out_msgs = Vec::new();
        for item in tx.out_msgs.values() {
            let msg_cell = item.map_err(tlb("out_msgs"))?;
            out_msgs.push(decode_message(&msg_cell)?);
        }

        Ok(TransactionRecord {
            lt: tx.lt,
            hash: TxHash(cell.repr_hash().0),
            account: tx.account.0,
            now: tx.now,
            state_update: StateUpdate {
                old_hash: state_update.old.0,
                new_hash: state_update.new.0,
            },
            in_msg,
            out_msgs,
            total_fees: tx.total_fees.tokens.into_inner(),
            description: decode_description(&info),
            boc: Boc::encode_base64(&cell),
        })
    }

    fn encode_shard_account(&self, account: &AccountSnapshot) -> Result<String> {
        let err = tlb;

        let mut acc = CellBuilder::new();
        acc.store_bit_one().map_err(err("Account"))?;
        // addr_std$10 anycast:nothing
        acc.store_uint(0b100, 3).map_err(err("MsgAddressInt"))?;
        acc.store_u8(account.address.workchain as u8)
            .map_err(err("MsgAddressInt"))?;
        acc.store_u256(&HashBytes(account.address.hash))
            .map_err(err("MsgAddressInt"))?;

        let storage = &account.storage;
        store_var_uint(&mut acc, storage.cells as u128, 3)?;
        store_var_uint(&mut acc, storage.bits as u128, 3)?;
        store_var_uint(&mut acc, storage.public_cells as u128, 3)?;
        acc.store_u32(storage.last_paid).map_err(err("StorageInfo"))?;
        match storage.due_payment {
            Some(due) => {
                acc.store_bit_one().map_err(err("StorageInfo"))?;
                store_var_uint(&mut acc, due, 4)?;
            }
            None => acc.store_bit_zero().map_err(err("StorageInfo"))?,
        }

        acc.store_u64(account.storage_last_lt)
            .map_err(err("AccountStorage"))?;
        store_var_uint(&mut acc, account.balance, 4)?;
        // no extra currencies
        acc.store_bit_zero().map_err(err("CurrencyCollection"))?;

        match &account.state {
            ContractState::Uninit => acc.store_uint(0b00, 2).map_err(err("AccountState"))?,
            ContractState::Frozen { state_hash } => {
                acc.store_uint(0b01, 2).map_err(err("AccountState"))?;
                acc.store_u256(&HashBytes(*state_hash))
                    .map_err(err("AccountState"))?;
            }
            ContractState::Active { code, data } => {
                acc.store_bit_one().map_err(err("AccountState"))?;
                // split_depth, special
                acc.store_uint(0b00, 2).map_err(err("StateInit"))?;
                for part in [code, data] {
                    match part {
                        Some(boc) => {
                            let cell = decode_cell(boc, "StateInit")?;
                            acc.store_bit_one().map_err(err("StateInit"))?;
                            acc.store_reference(cell).map_err(err("StateInit"))?;
                        }
                        None => acc.store_bit_zero().map_err(err("StateInit"))?,
                    }
                }
                // empty library
                acc.store_bit_zero().map_err(err("StateInit"))?;
            }
        }
        let account_cell = acc.build().map_err(err("Account"))?;

        let (last_lt, last_hash) = account.last_transaction.unwrap_or((0, TxHash::ZERO));
        let mut shard = CellBuilder::new();
        shard
            .store_reference(account_cell)
            .map_err(err("ShardAccount"))?;
        shard
            .store_u256(&HashBytes(last_hash.0))
            .map_err(err("ShardAccount"))?;
        shard.store_u64(last_lt).map_err(err("ShardAccount"))?;
        let cell = shard.build().map_err(err("ShardAccount"))?;
        Ok(Boc::encode_base64(&cell))
    }

    fn decode_shard_account(&self, boc: &str) -> Result<ShardAccountSummary> {
        let err = tlb;
        let cell = decode_cell(boc, "ShardAccount")?;
        let mut shard = cell.as_slice().map_err(err("ShardAccount"))?;
        let account_cell = shard.load_reference().map_err(err("ShardAccount"))?;
        let last_hash = shard.load_u256().map_err(err("ShardAccount"))?;
        let last_lt = shard.load_u64().map_err(err("ShardAccount"))?;

        let mut acc = account_cell.as_slice().map_err(err("Account"))?;
        let balance = if acc.load_bit().map_err(err("Account"))? {
            if acc.load_uint(2).map_err(err("MsgAddressInt"))? != 0b10 {
                return Err(ReplayError::codec("MsgAddressInt", "expected addr_std"));
            }
            if acc.load_bit().map_err(err("MsgAddressInt"))? {
                return Err(ReplayError::codec("MsgAddressInt", "anycast is not supported"));
            }
            acc.load_u8().map_err(err("MsgAddressInt"))?;
            acc.load_u256().map_err(err("MsgAddressInt"))?;

            for _ in 0..3 {
                load_var_uint(&mut acc, 3)?;
            }
            acc.load_u32().map_err(err("StorageInfo"))?;
            if acc.load_bit().map_err(err("StorageInfo"))? {
                load_var_uint(&mut acc, 4)?;
            }
            acc.load_u64().map_err(err("AccountStorage"))?;
            Some(load_var_uint(&mut acc, 4)?)
        } else {
            None
        };

        Ok(ShardAccountSummary {
            balance,
            last_transaction_lt: last_lt,
            last_transaction_hash: TxHash(last_hash.0),
        })
    }

    fn library_refs(&self, code_boc: &str) -> Result<Vec<[u8; 32]>> {
        let cell = decode_cell(code_boc, "code")?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        collect_library_refs(&*cell, &mut seen, &mut out);
        Ok(out)
    }

    fn encode_libraries(&self, libraries: &LibraryTable) -> Result<Option<String>> {
        let mut dict = Dict::<HashBytes, Cell>::new();
        for (hash, code) in libraries.iter() {
            let cell = decode_cell(code, "library code")?;
            dict.set(HashBytes(*hash), cell)
                .map_err(tlb("library dictionary"))?;
        }
        Ok(dict.root().as_ref().map(|root| Boc::encode_base64(root)))
    }
}

/// Whether `boc` decodes as a bag of cells at all. Used to validate
/// upstream payloads before they are passed on untouched.
pub fn is_valid_boc(boc: &str) -> bool {
    base64_decode(boc, "bag of cells")
        .ok()
        .is_some_and(|bytes| Boc::decode(&bytes).is_ok())
}
