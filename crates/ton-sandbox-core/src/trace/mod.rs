//! TVM execution trace parsing.
//!
//! With `full_location_stack_verbose` the emulator writes, for every step,
//! an `execute <INSTRUCTION>` line followed by a `stack: [ ... ]` line with
//! the stack after the instruction. [`parse_vm_log`] pairs them into
//! [`TraceEntry`] values.

pub mod lexer;
pub mod parser;
pub mod value;

pub use parser::parse_stack_line;
pub use value::{StackValue, MAX_TUPLE_LEN, STD_ADDRESS_BITS};

use serde::Serialize;

/// Name given to a stack line that follows another stack line.
pub const UNKNOWN_INSTRUCTION: &str = "unknown instruction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub instruction: String,
    pub stack_after: Vec<StackValue>,
}

pub fn parse_vm_log(raw: &str) -> Vec<TraceEntry> {
    let mut entries: Vec<TraceEntry> = Vec::new();
    let mut pending: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(instruction) = line.strip_prefix("execute ") {
            if let Some(dropped) = pending.replace(instruction.trim().to_string()) {
                tracing::warn!(instruction = %dropped, "no stack recorded for instruction");
            }
        } else if line.starts_with("stack:") {
            let stack_after = parse_stack_line(line);
            match pending.take() {
                Some(instruction) => entries.push(TraceEntry {
                    instruction,
                    stack_after,
                }),
                // the first stack line is the initial stack
                None if entries.is_empty() => {}
                None => {
                    tracing::warn!(after = entries.len(), "stack line without an instruction");
                    entries.push(TraceEntry {
                        instruction: UNKNOWN_INSTRUCTION.to_string(),
                        stack_after,
                    });
                }
            }
        }
    }

    if let Some(dropped) = pending {
        tracing::warn!(instruction = %dropped, "no stack recorded for instruction");
    }
    entries
}
