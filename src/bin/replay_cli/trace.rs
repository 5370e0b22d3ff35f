//! Trace command - parse a saved VM log offline

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use ton_sandbox_core::parse_vm_log;

use super::output::print_trace;

#[derive(Args, Debug)]
pub struct TraceCmd {
    /// File holding emulator output at full_location_stack_verbose
    pub file: PathBuf,
}

impl TraceCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        let raw = std::fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        let entries = parse_vm_log(&raw);

        if json_output {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            print_trace(&entries);
        }
        Ok(())
    }
}
