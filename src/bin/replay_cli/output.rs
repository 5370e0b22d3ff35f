//! Output formatting for the ton-replay CLI

use serde::Serialize;
use ton_replay_types::{ReplayError, StdAddress};
use ton_resolver::TxLinks;
use ton_sandbox_core::{ComputeInfo, EmulationReport, TraceEntry};

const NANOTONS: u128 = 1_000_000_000;

/// `1500000000` -> `1.5 TON`.
pub fn format_ton(nanotons: u128) -> String {
    let whole = nanotons / NANOTONS;
    let frac = nanotons % NANOTONS;
    if frac == 0 {
        return format!("{} TON", whole);
    }
    let frac = format!("{:09}", frac);
    format!("{}.{} TON", whole, frac.trim_end_matches('0'))
}

fn format_address(address: &StdAddress, testnet: bool) -> String {
    format!("{} ({})", address.to_friendly(true, testnet), address.to_raw())
}

pub fn print_report(report: &EmulationReport, testnet: bool, show_trace: bool) {
    let identity = &report.identity;
    println!("Transaction   {}:{}", identity.lt, identity.hash);
    println!("Contract      {}", format_address(&report.contract, testnet));
    match &report.sender {
        Some(sender) => println!("Sender        {}", format_address(sender, testnet)),
        None => println!("Sender        none (external message)"),
    }
    if let Some(amount) = report.amount {
        println!("Amount        {}", format_ton(amount));
    }
    println!("Time          {} (lt {})", report.utime, report.lt);

    match report.compute_info {
        ComputeInfo::Skipped => println!("Compute       skipped"),
        ComputeInfo::Executed {
            success,
            exit_code,
            vm_steps,
            gas_used,
            gas_fees,
        } => println!(
            "Compute       {} exit code {}, {} steps, {} gas ({})",
            if success { "ok," } else { "failed," },
            exit_code,
            vm_steps,
            gas_used,
            format_ton(gas_fees)
        ),
    }

    let money = &report.money;
    println!(
        "Balance       {} -> {}",
        format_ton(money.balance_before),
        format_ton(money.balance_after)
    );
    println!("Sent          {}", format_ton(money.sent_total));
    println!("Fees          {}", format_ton(money.total_fees));

    if report.state_update_hash_ok {
        println!("State hash    \x1b[32mmatches chain\x1b[0m");
    } else {
        println!("State hash    \x1b[31mdiffers from chain\x1b[0m");
    }

    println!();
    print_links(&report.links);

    if show_trace {
        println!();
        print_trace(&report.compute_logs);
    }
}

pub fn print_links(links: &TxLinks) {
    for (name, link) in links.iter() {
        println!("{:<10} {}", name, link);
    }
}

pub fn print_trace(entries: &[TraceEntry]) {
    println!("Trace: {} instructions", entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let stack: Vec<String> = entry.stack_after.iter().map(ToString::to_string).collect();
        println!("{:>5}  {}", index + 1, entry.instruction);
        println!("       [ {} ]", stack.join(" "));
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            kind: Option<&'static str>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            kind: error.downcast_ref::<ReplayError>().map(ReplayError::kind),
        };
        serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
    } else {
        let mut out = format!("\x1b[31mError:\x1b[0m {}", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("\nCaused by:");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("\n  {}: {}", idx + 1, cause));
            }
        }
        out
    }
}
