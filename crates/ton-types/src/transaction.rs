//! Decoded transaction and message records.
//!
//! These carry only what the replay pipeline reads. The encoded form travels
//! alongside (`boc`) so that the emulator can be fed the exact bytes the
//! chain recorded.

use serde::{Deserialize, Serialize};

use crate::address::StdAddress;
use crate::identity::TxHash;

/// `MsgAddress` flattened to the cases the compiler distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MsgAddress {
    /// `addr_none`
    None,
    Std(StdAddress),
    /// `addr_extern`, rendered as hex of its bits.
    External(String),
    /// `addr_var` or an anycast standard address, rendered raw.
    Var(String),
}

impl MsgAddress {
    pub fn as_std(&self) -> Option<&StdAddress> {
        match self {
            MsgAddress::Std(addr) => Some(addr),
            _ => None,
        }
    }
}

impl std::fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgAddress::None => write!(f, "addr_none"),
            MsgAddress::Std(addr) => write!(f, "{}", addr),
            MsgAddress::External(bits) => write!(f, "extern:{}", bits),
            MsgAddress::Var(raw) => write!(f, "var:{}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageInfo {
    Internal {
        src: MsgAddress,
        dst: MsgAddress,
        #[serde(with = "crate::serde_utils::coins")]
        value: u128,
    },
    ExternalIn {
        src: MsgAddress,
        dst: MsgAddress,
    },
    ExternalOut {
        src: MsgAddress,
        dst: MsgAddress,
    },
}

impl MessageInfo {
    pub fn src(&self) -> &MsgAddress {
        match self {
            MessageInfo::Internal { src, .. }
            | MessageInfo::ExternalIn { src, .. }
            | MessageInfo::ExternalOut { src, .. } => src,
        }
    }

    pub fn dst(&self) -> &MsgAddress {
        match self {
            MessageInfo::Internal { dst, .. }
            | MessageInfo::ExternalIn { dst, .. }
            | MessageInfo::ExternalOut { dst, .. } => dst,
        }
    }

    /// Coins carried by an internal message; `None` otherwise.
    pub fn value(&self) -> Option<u128> {
        match self {
            MessageInfo::Internal { value, .. } => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Base64 bag of cells rooted at the message cell.
    pub boc: String,
    pub info: MessageInfo,
    /// `init.code` as a base64 bag of cells, when the message carries a state init.
    pub init_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub old_hash: [u8; 32],
    pub new_hash: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedCompute {
    pub success: bool,
    pub exit_code: i32,
    pub vm_steps: u32,
    pub gas_used: u64,
    #[serde(with = "crate::serde_utils::coins")]
    pub gas_fees: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComputePhaseRecord {
    Skipped { reason: String },
    Executed(ExecutedCompute),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPhaseRecord {
    pub success: bool,
    pub result_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionDescription {
    Ordinary {
        compute: ComputePhaseRecord,
        action: Option<ActionPhaseRecord>,
        aborted: bool,
    },
    /// Tick-tock, split, merge and storage transactions.
    Other { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub lt: u64,
    pub hash: TxHash,
    /// Account id (without workchain) the transaction belongs to.
    pub account: [u8; 32],
    pub now: u32,
    pub state_update: StateUpdate,
    pub in_msg: Option<MessageRecord>,
    pub out_msgs: Vec<MessageRecord>,
    #[serde(with = "crate::serde_utils::coins")]
    pub total_fees: u128,
    pub description: TransactionDescription,
    /// Base64 bag of cells rooted at the transaction cell.
    pub boc: String,
}

impl TransactionRecord {
    /// Sum of coins carried by outbound internal messages.
    pub fn sent_total(&self) -> u128 {
        self.out_msgs
            .iter()
            .filter_map(|msg| msg.info.value())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(value: u128) -> MessageRecord {
        MessageRecord {
            boc: String::new(),
            info: MessageInfo::Internal {
                src: MsgAddress::Std(StdAddress::new(0, [1u8; 32])),
                dst: MsgAddress::Std(StdAddress::new(0, [2u8; 32])),
                value,
            },
            init_code: None,
        }
    }

    #[test]
    fn test_sent_total_ignores_external_out() {
        let mut out_msgs = vec![internal(5), internal(7)];
        out_msgs.push(MessageRecord {
            boc: String::new(),
            info: MessageInfo::ExternalOut {
                src: MsgAddress::Std(StdAddress::new(0, [2u8; 32])),
                dst: MsgAddress::None,
            },
            init_code: None,
        });
        let tx = TransactionRecord {
            lt: 1,
            hash: TxHash::ZERO,
            account: [2u8; 32],
            now: 0,
            state_update: StateUpdate {
                old_hash: [0u8; 32],
                new_hash: [0u8; 32],
            },
            in_msg: None,
            out_msgs,
            total_fees: 0,
            description: TransactionDescription::Other {
                kind: "tick_tock".into(),
            },
            boc: String::new(),
        };
        assert_eq!(tx.sent_total(), 12);
    }

    #[test]
    fn test_record_survives_json() {
        let tx = TransactionRecord {
            lt: 47_670_702_000_009,
            hash: TxHash([9u8; 32]),
            account: [2u8; 32],
            now: 1_719_000_000,
            state_update: StateUpdate {
                old_hash: [1u8; 32],
                new_hash: [2u8; 32],
            },
            in_msg: Some(internal(u128::from(u64::MAX) + 1)),
            out_msgs: vec![internal(5)],
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
            boc: "tx".into(),
        };

        let json = serde_json::to_string(&tx).unwrap();
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_message_accessors() {
        let msg = internal(3);
        assert_eq!(msg.info.value(), Some(3));
        assert!(msg.info.src().as_std().is_some());
        assert_eq!(MsgAddress::None.to_string(), "addr_none");
    }
}
