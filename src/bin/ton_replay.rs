//! ton-replay: replay a historical TON transaction locally
//!
//! ## Example Usage
//!
//! ```bash
//! # Replay a transaction and print a summary with the VM trace
//! TON_EMULATOR_BIN=/opt/ton/emulator-bridge \
//!     ton-replay replay https://tonviewer.com/transaction/3e5f4979... --show-trace
//!
//! # Same, as JSON
//! ton-replay --json replay 47670702000009:3e5f4979...
//!
//! # Canonical explorer links for a reference
//! ton-replay links Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=
//!
//! # Parse a saved full_location_stack_verbose VM log
//! ton-replay trace vm.log
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ton_replay_types::Network;

mod replay_cli;

use replay_cli::{links::LinksCmd, output::format_error, replay::ReplayCmd, trace::TraceCmd};

#[derive(Parser)]
#[command(
    name = "ton-replay",
    author,
    version,
    about = "Replay historical TON transactions locally",
    long_about = "Rebuilds the state a TON transaction saw on chain, re-executes it through an \
                  emulator bridge and reconstructs its TVM trace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use testnet endpoints and explorer links
    #[arg(long, global = true)]
    testnet: bool,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a transaction and report the outcome
    Replay(ReplayCmd),

    /// Resolve a reference and print its explorer links
    Links(LinksCmd),

    /// Parse a saved VM log without touching the network
    Trace(TraceCmd),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        testnet,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let network = if testnet {
        Network::Testnet
    } else {
        Network::Mainnet
    };

    let result = match command {
        Commands::Replay(cmd) => cmd.execute(network, json).await,
        Commands::Links(cmd) => cmd.execute(network, json).await,
        Commands::Trace(cmd) => cmd.execute(json),
    };

    if let Err(err) = &result {
        eprintln!("{}", format_error(err, json));
        std::process::exit(1);
    }
    result
}
