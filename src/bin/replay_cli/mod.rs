//! Subcommands of the `ton-replay` CLI.

pub mod links;
pub mod output;
pub mod replay;
pub mod trace;
