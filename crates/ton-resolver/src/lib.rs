//! TON Resolver
//!
//! Turns heterogeneous transaction references into a canonical
//! [`TransactionIdentity`], and back into explorer links.
//!
//! Accepted references:
//!
//! | form | example | lookup |
//! |---|---|---|
//! | ton.cx | `https://ton.cx/tx/<lt>:<hash b64>:<address>` | no |
//! | tonviewer | `https://tonviewer.com/transaction/<hash hex>` | yes |
//! | tonscan | `https://tonscan.org/tx/<hash b64>` | yes |
//! | toncoin explorer | `https://explorer.toncoin.org/transaction?account=..&lt=..&hash=..` | no |
//! | raw pair | `<lt>:<hash hex>` | yes |
//! | bare hash | `<hash hex or base64>` | yes |
//!
//! Testnet hosts of every explorer are accepted too.

pub mod links;
pub mod lookup;
pub mod reference;

pub use links::{to_links, TxLinks};
pub use lookup::{IndexerLookup, TransactionLookup};
pub use reference::{parse_reference, ParsedReference};

use ton_replay_types::{Network, ReplayError, Result, TransactionIdentity};

/// Resolve `reference` into a canonical identity, consulting `lookup` for
/// fields the reference does not carry.
pub async fn resolve(
    reference: &str,
    network: Network,
    lookup: &dyn TransactionLookup,
) -> Result<TransactionIdentity> {
    let parsed = parse_reference(reference)?;
    tracing::debug!(?parsed, %network, "parsed transaction reference");

    let (supplied_lt, hash) = match parsed {
        ParsedReference::Complete(identity) => return Ok(identity),
        ParsedReference::LtAndHash { lt, hash } => (Some(lt), hash),
        ParsedReference::HashOnly(hash) => (None, hash),
    };

    let found = lookup
        .lookup(&hash)
        .await?
        .ok_or_else(|| ReplayError::unrecognized(reference, format!("no transaction with hash {}", hash)))?;

    if found.hash != hash {
        return Err(ReplayError::unrecognized(
            reference,
            format!("lookup returned a different transaction ({})", found.hash),
        ));
    }
    if let Some(lt) = supplied_lt {
        if lt != found.lt {
            return Err(ReplayError::unrecognized(
                reference,
                format!("lt {} does not match the indexed lt {}", lt, found.lt),
            ));
        }
    }
    Ok(found)
}
