//! TON transaction replay
//!
//! Re-executes a historical TON transaction against the exact state it saw
//! on chain and reports what happened inside the TVM:
//!
//! - **Identity resolution**: explorer links, `lt:hash` pairs and bare hashes
//!   become one canonical `(lt, hash, address)` triple ([`resolver`])
//! - **State snapshots**: block config, pre-block account state, libraries and
//!   same-block history from public HTTP services ([`state`])
//! - **Replay and tracing**: sequential replay of earlier transactions, a
//!   traced run of the target and a typed view of the VM log ([`core`])
//!
//! The `ton-replay` binary wraps [`core::ReplayEngine`] behind a small CLI.

pub use ton_replay_types as types;
pub use ton_resolver as resolver;
pub use ton_sandbox_core as core;
pub use ton_state_fetcher as state;
pub use ton_transport as transport;

pub use ton_replay_types::{Network, ReplayError, TransactionIdentity};
pub use ton_sandbox_core::{EmulationReport, EngineConfig, ReplayEngine};
