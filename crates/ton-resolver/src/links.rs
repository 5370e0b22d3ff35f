//! Canonical explorer links for a resolved transaction.

use serde::{Deserialize, Serialize};
use ton_replay_types::{Network, TransactionIdentity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLinks {
    pub toncx: String,
    pub tonviewer: String,
    pub tonscan: String,
    pub toncoin: String,
}

impl TxLinks {
    /// `(explorer name, link)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("ton.cx", self.toncx.as_str()),
            ("tonviewer", self.tonviewer.as_str()),
            ("tonscan", self.tonscan.as_str()),
            ("toncoin", self.toncoin.as_str()),
        ]
        .into_iter()
    }
}

/// Render one link per explorer. Pure; every link resolves back to
/// `identity`.
pub fn to_links(identity: &TransactionIdentity, network: Network) -> TxLinks {
    let testnet = network.is_testnet();
    let address = identity.address.to_friendly(true, testnet);
    let (toncx, tonviewer, tonscan, toncoin) = if testnet {
        (
            "testnet.ton.cx",
            "testnet.tonviewer.com",
            "testnet.tonscan.org",
            "test-explorer.toncoin.org",
        )
    } else {
        ("ton.cx", "tonviewer.com", "tonscan.org", "explorer.toncoin.org")
    };

    TxLinks {
        toncx: format!(
            "https://{}/tx/{}:{}:{}",
            toncx,
            identity.lt,
            identity.hash.to_base64(),
            address
        ),
        tonviewer: format!("https://{}/transaction/{}", tonviewer, identity.hash.to_hex()),
        tonscan: format!("https://{}/tx/{}", tonscan, identity.hash.to_base64()),
        toncoin: format!(
            "https://{}/transaction?account={}&lt={}&hash={}",
            toncoin,
            address,
            identity.lt,
            identity.hash.to_hex()
        ),
    }
}
