//! Links command - resolve a reference into canonical explorer links

use anyhow::Result;
use clap::Args;

use ton_replay_types::Network;
use ton_resolver::{resolve, to_links};
use ton_sandbox_core::{indexer_lookup, EngineConfig};

use super::output::print_links;

#[derive(Args, Debug)]
pub struct LinksCmd {
    /// Explorer link, `lt:hash` pair or bare transaction hash
    pub reference: String,
}

impl LinksCmd {
    pub async fn execute(&self, network: Network, json_output: bool) -> Result<()> {
        let config = EngineConfig::from_env(network);
        let lookup = indexer_lookup(&config.transport);
        let identity = resolve(&self.reference, network, &lookup).await?;
        let links = to_links(&identity, network);

        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "identity": identity,
                    "links": links,
                }))?
            );
        } else {
            println!("Transaction   {}:{}", identity.lt, identity.hash);
            println!("Account       {}", identity.address.to_raw());
            println!();
            print_links(&links);
        }
        Ok(())
    }
}
