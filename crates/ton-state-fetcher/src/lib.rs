//! Pre-transaction state snapshots.
//!
//! Given a resolved [`TransactionIdentity`](ton_replay_types::TransactionIdentity),
//! [`SnapshotBuilder::build`] gathers everything a deterministic replay of
//! that transaction needs:
//!
//! - the account state as of the masterchain block before the one that
//!   committed the transaction
//! - the account's earlier transactions in the same block, oldest first
//! - the config, random seed and library cells
//!
//! Upstream services are reached through the traits in [`source`];
//! [`RemoteSources`] implements all of them over the public HTTP APIs.

pub mod builder;
pub mod libraries;
pub mod remote;
pub mod source;
pub mod types;

pub use builder::{block_bounds, split_history, SnapshotBuilder};
pub use libraries::{fetch_libraries, referenced_libraries};
pub use remote::RemoteSources;
pub use source::{
    BlockAnchor, BlockDataSource, BlockIndex, BlockTransaction, LibraryDirectory,
    MasterchainBlock, ShardBlockRef, ShardSummary, SnapshotSources, TransactionArchive,
};
pub use types::{BlockConfig, ReplaySnapshot};
