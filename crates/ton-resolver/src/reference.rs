//! Parsing of user-supplied transaction references.
//!
//! Parsing is pure: it only decides which fields a reference carries. The
//! missing fields are filled in by [`crate::resolve`] through a
//! [`crate::TransactionLookup`].

use std::borrow::Cow;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use ton_replay_types::{ReplayError, Result, StdAddress, TransactionIdentity, TxHash};
use url::Url;

/// What a reference string told us before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    /// ton.cx and toncoin explorer links carry the whole identity.
    Complete(TransactionIdentity),
    /// `<lt>:<hex hash>` as copied from explorer fields; the account is
    /// unknown.
    LtAndHash { lt: u64, hash: TxHash },
    /// tonviewer, tonscan and bare hashes.
    HashOnly(TxHash),
}

impl ParsedReference {
    pub fn needs_lookup(&self) -> bool {
        !matches!(self, ParsedReference::Complete(_))
    }

    pub fn hash(&self) -> TxHash {
        match self {
            ParsedReference::Complete(identity) => identity.hash,
            ParsedReference::LtAndHash { hash, .. } | ParsedReference::HashOnly(hash) => *hash,
        }
    }
}

/// Which explorer a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Explorer {
    TonCx,
    TonViewer,
    TonScan,
    Toncoin,
}

fn explorer_for_host(host: &str) -> Option<Explorer> {
    match host {
        "ton.cx" | "testnet.ton.cx" => Some(Explorer::TonCx),
        "tonviewer.com" | "testnet.tonviewer.com" => Some(Explorer::TonViewer),
        "tonscan.org" | "testnet.tonscan.org" => Some(Explorer::TonScan),
        "explorer.toncoin.org" | "test-explorer.toncoin.org" => Some(Explorer::Toncoin),
        _ => None,
    }
}

/// Percent-decoded path text; links copied from browsers escape `+`, `/`
/// and `=` in base64 hashes.
fn decode_component(text: &str) -> Cow<'_, str> {
    percent_decode_str(text).decode_utf8_lossy()
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn parse_lt(reference: &str, text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| ReplayError::unrecognized(reference, format!("'{}' is not a logical time", text)))
}

fn parse_hash(reference: &str, text: &str) -> Result<TxHash> {
    TxHash::parse(&decode_component(text))
        .map_err(|e| ReplayError::unrecognized(reference, e.to_string()))
}

fn parse_address(reference: &str, text: &str) -> Result<StdAddress> {
    StdAddress::from_str(&decode_component(text))
        .map_err(|e| ReplayError::unrecognized(reference, e.to_string()))
}

fn parse_link(reference: &str, explorer: Explorer, url: &Url) -> Result<ParsedReference> {
    let path = url.path().trim_end_matches('/');

    match explorer {
        Explorer::TonCx => {
            // /tx/<lt>:<hash b64>:<address>; the base64 hash may contain '/'
            let info = path
                .strip_prefix("/tx/")
                .ok_or_else(|| ReplayError::unrecognized(reference, "expected /tx/<lt>:<hash>:<address>"))?;
            let mut parts = info.splitn(3, ':');
            let (Some(lt), Some(hash), Some(address)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ReplayError::unrecognized(
                    reference,
                    "expected /tx/<lt>:<hash>:<address>",
                ));
            };
            Ok(ParsedReference::Complete(TransactionIdentity::new(
                parse_lt(reference, lt)?,
                parse_hash(reference, hash)?,
                parse_address(reference, address)?,
            )))
        }
        Explorer::TonViewer => {
            let hash = path
                .strip_prefix("/transaction/")
                .ok_or_else(|| ReplayError::unrecognized(reference, "expected /transaction/<hash>"))?;
            Ok(ParsedReference::HashOnly(parse_hash(reference, hash)?))
        }
        Explorer::TonScan => {
            let hash = path
                .strip_prefix("/tx/")
                .ok_or_else(|| ReplayError::unrecognized(reference, "expected /tx/<hash>"))?;
            Ok(ParsedReference::HashOnly(parse_hash(reference, hash)?))
        }
        Explorer::Toncoin => {
            if path != "/transaction" {
                return Err(ReplayError::unrecognized(reference, "expected /transaction?account=..&lt=..&hash=.."));
            }
            let field = |name: &str| {
                query_param(url, name).ok_or_else(|| {
                    ReplayError::unrecognized(reference, format!("missing '{}' parameter", name))
                })
            };
            Ok(ParsedReference::Complete(TransactionIdentity::new(
                parse_lt(reference, &field("lt")?)?,
                parse_hash(reference, &field("hash")?)?,
                parse_address(reference, &field("account")?)?,
            )))
        }
    }
}

/// Classify a reference string.
///
/// ```
/// use ton_resolver::{parse_reference, ParsedReference};
///
/// let parsed = parse_reference(
///     "47670702000009:3e5f49798de239da5d8f80b4dc300204d37613e4203a3f7b877c04a88c81856b",
/// )
/// .unwrap();
/// assert!(matches!(parsed, ParsedReference::LtAndHash { lt: 47670702000009, .. }));
/// ```
pub fn parse_reference(reference: &str) -> Result<ParsedReference> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(ReplayError::unrecognized(reference, "empty reference"));
    }

    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        let url = Url::parse(trimmed)
            .map_err(|e| ReplayError::unrecognized(reference, e.to_string()))?;
        let host = url.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        let explorer = explorer_for_host(host)
            .ok_or_else(|| ReplayError::unrecognized(reference, format!("unsupported explorer '{}'", host)))?;
        return parse_link(reference, explorer, &url);
    }

    if let Some((lt, hash)) = trimmed.split_once(':') {
        if let (Ok(lt), Ok(hash)) = (lt.parse::<u64>(), TxHash::parse(hash)) {
            return Ok(ParsedReference::LtAndHash { lt, hash });
        }
    }

    TxHash::parse(trimmed)
        .map(ParsedReference::HashOnly)
        .map_err(|_| ReplayError::unrecognized(reference, "not a link, lt:hash pair or transaction hash"))
}
