//! Shared types for the ton-replay workspace.
//!
//! This crate sits at the bottom of the dependency graph. It holds what every
//! stage of the replay pipeline agrees on:
//!
//! - [`TransactionIdentity`], [`TxHash`] and [`StdAddress`]: the canonical
//!   `(lt, hash, address)` triple and its textual forms
//! - [`AccountSnapshot`] and [`TransactionRecord`]: decoded chain data
//! - [`StateCodec`]: the bag-of-cells seam, with [`TlbCodec`] as the real
//!   implementation
//! - [`ReplayError`]: the error taxonomy
//! - [`ProgressSink`]: phase reporting

pub mod account;
pub mod address;
pub mod codec;
pub mod encoding;
pub mod env_utils;
pub mod error;
pub mod identity;
pub mod progress;
pub mod serde_utils;
pub mod transaction;

pub use account::{AccountSnapshot, ContractState, LibraryTable, ShardAccountSummary, StorageStats};
pub use address::StdAddress;
pub use codec::{StateCodec, TlbCodec};
pub use error::{AddressRole, EmulationRun, ReplayError, Result};
pub use identity::{Network, TransactionIdentity, TxHash};
pub use progress::{NoProgress, ProgressSink, TracingProgress};
pub use transaction::{
    ActionPhaseRecord, ComputePhaseRecord, ExecutedCompute, MessageInfo, MessageRecord,
    MsgAddress, StateUpdate, TransactionDescription, TransactionRecord,
};
