//! Replay command - re-execute a historical transaction and report on it

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use ton_replay_types::{Network, TracingProgress};
use ton_sandbox_core::{EngineConfig, HashMismatchPolicy, ReplayEngine};

use super::output::print_report;

#[derive(Args, Debug)]
pub struct ReplayCmd {
    /// Explorer link, `lt:hash` pair or bare transaction hash
    pub reference: String,

    /// Emulator bridge binary (overrides TON_EMULATOR_BIN)
    #[arg(long)]
    pub emulator: Option<PathBuf>,

    /// What to do when a replayed earlier transaction ends in a state the
    /// chain does not know: continue or abort
    #[arg(long)]
    pub on_hash_mismatch: Option<HashMismatchPolicy>,

    /// Print the VM trace after the summary
    #[arg(long)]
    pub show_trace: bool,
}

impl ReplayCmd {
    fn config(&self, network: Network) -> EngineConfig {
        let mut config = EngineConfig::from_env(network);
        if let Some(path) = &self.emulator {
            config = config.with_emulator_bin(path);
        }
        if let Some(policy) = self.on_hash_mismatch {
            config = config.with_hash_mismatch_policy(policy);
        }
        config
    }

    pub async fn execute(&self, network: Network, json_output: bool) -> Result<()> {
        let config = self.config(network);
        let engine = ReplayEngine::from_config(&config)?;

        let outcome = if json_output {
            engine.run(&self.reference, &TracingProgress).await
        } else {
            let progress = |label: &str| eprintln!("{}...", label);
            engine.run(&self.reference, &progress).await
        };
        let report = outcome.with_context(|| format!("replay of {} failed", self.reference))?;

        if json_output {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, network.is_testnet(), self.show_trace);
        }
        Ok(())
    }
}
