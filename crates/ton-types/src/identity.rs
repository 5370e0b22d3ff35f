//! Canonical transaction identity.
//!
//! Every downstream component accepts only a [`TransactionIdentity`]; the
//! resolver is the one place that turns links and loose strings into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::StdAddress;
use crate::encoding::{base64_encode, base64_url_encode, decode_bytes32};
use crate::error::{ReplayError, Result};

/// Which TON network a reference lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_testnet(self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(ReplayError::codec("network", format!("unknown network '{}'", other))),
        }
    }
}

/// 256-bit transaction hash (the representation hash of the transaction cell).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub const ZERO: TxHash = TxHash([0u8; 32]);

    /// Accepts 64 hex digits or base64 in either alphabet.
    pub fn parse(text: &str) -> Result<Self> {
        decode_bytes32(text, "transaction hash").map(TxHash)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.0)
    }

    pub fn to_base64_url(&self) -> String {
        base64_url_encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        TxHash(bytes)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// `(lt, hash, address)`: uniquely identifies one transaction of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionIdentity {
    pub lt: u64,
    pub hash: TxHash,
    pub address: StdAddress,
}

impl TransactionIdentity {
    pub fn new(lt: u64, hash: TxHash, address: StdAddress) -> Self {
        Self { lt, hash, address }
    }
}

impl fmt::Display for TransactionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.lt, self.hash, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_forms() {
        let hash = TxHash::parse("Pl9JeY3iOdpdj4C03DACBNN2E+QgOj97h3wEqIyBhWs=").unwrap();
        assert_eq!(
            hash.to_hex(),
            "3e5f49798de239da5d8f80b4dc300204d37613e4203a3f7b877c04a88c81856b"
        );
        assert_eq!(hash.to_base64_url(), "Pl9JeY3iOdpdj4C03DACBNN2E-QgOj97h3wEqIyBhWs=");
        assert_eq!(TxHash::parse(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!(Network::default(), Network::Mainnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_identity_json() {
        let identity = TransactionIdentity::new(
            47670702000009,
            TxHash::parse("3e5f49798de239da5d8f80b4dc300204d37613e4203a3f7b877c04a88c81856b")
                .unwrap(),
            "EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_".parse().unwrap(),
        );
        let json = serde_json::to_value(identity).unwrap();
        assert_eq!(json["lt"], 47670702000009u64);
        assert_eq!(json["address"], "EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_");
        let back: TransactionIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }
}
