//! TON Sandbox Core
//!
//! Replays a historical TON transaction locally and explains it.
//!
//! # Pipeline
//!
//! 1. [`ton_resolver`] turns a link or hash into a transaction identity
//! 2. [`ton_state_fetcher`] builds the pre-block snapshot
//! 3. [`replay::SequentialReplayer`] re-applies the account's earlier
//!    transactions of the same block
//! 4. the target runs twice through a [`emulator::TransactionEmulator`]:
//!    once plain, once with a full VM trace
//! 5. [`trace::parse_vm_log`] types the trace and [`compile::compile`]
//!    assembles the [`report::EmulationReport`]
//!
//! [`orchestrator::ReplayEngine`] runs all of it.
//!
//! # Example
//!
//! ```ignore
//! use ton_replay_types::{Network, TracingProgress};
//! use ton_sandbox_core::{EngineConfig, ReplayEngine};
//!
//! let config = EngineConfig::from_env(Network::Mainnet);
//! let engine = ReplayEngine::from_config(&config)?;
//! let report = engine
//!     .run("https://tonviewer.com/transaction/3e5f4979...", &TracingProgress)
//!     .await?;
//! println!("exit code: {:?}", report.compute_info);
//! ```

pub mod compile;
pub mod config;
pub mod emulator;
pub mod orchestrator;
pub mod replay;
pub mod report;
pub mod trace;

pub use compile::{compile, CompileInput};
pub use config::{EngineConfig, HashMismatchPolicy};
pub use emulator::{
    EmulationRequest, EmulationResponse, ProcessEmulator, TransactionEmulator, Verbosity,
};
pub use orchestrator::{indexer_lookup, ReplayEngine};
pub use replay::{ReplayOutcome, ReplayStep, SequentialReplayer};
pub use report::{ComputeInfo, EmulationReport, MoneyFlow};
pub use trace::{parse_stack_line, parse_vm_log, StackValue, TraceEntry};
