//! Standard TON account addresses.
//!
//! Two textual forms are understood:
//!
//! - raw: `<workchain>:<64 hex digits>`, e.g. `0:dae153a7...8d20`
//! - user-friendly: 48 base64 characters (standard or URL-safe alphabet)
//!   encoding 36 bytes `flags | workchain | hash[32] | crc16`
//!
//! The friendly form carries a bounceable/non-bounceable flag and a
//! test-only bit; neither is part of the address identity, so two strings
//! that differ only in those flags parse to equal [`StdAddress`] values.
//! Decoding, checksums and rendering are delegated to
//! [`everscale_types::models::StdAddr`].

use std::fmt;
use std::str::FromStr;

use everscale_types::cell::HashBytes;
use everscale_types::error::ParseAddrError;
use everscale_types::models::{Base64StdAddrFlags, DisplayBase64StdAddr, StdAddr, StdAddrFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ReplayError, Result};

/// `addr_std` without anycast: an 8-bit workchain and a 256-bit account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StdAddress {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl StdAddress {
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Parse the raw `wc:hex` form.
    pub fn parse_raw(s: &str) -> Result<Self> {
        let format = StdAddrFormat {
            allow_raw: true,
            allow_base64: false,
            allow_base64_url: false,
        };
        Self::parse_with(s.trim(), format)
            .map_err(|e| ReplayError::codec("raw address", format!("'{}': {}", s, e)))
    }

    /// Parse the 48-character user-friendly form, verifying the checksum.
    pub fn parse_friendly(s: &str) -> Result<Self> {
        let format = StdAddrFormat {
            allow_raw: false,
            ..StdAddrFormat::any()
        };
        Self::parse_with(s.trim(), format).map_err(|e| {
            let detail = format!("'{}': {} (bad checksum or length)", s, e);
            ReplayError::codec("friendly address", detail)
        })
    }

    fn parse_with(s: &str, format: StdAddrFormat) -> std::result::Result<Self, ParseAddrError> {
        let (addr, _flags) = StdAddr::from_str_ext(s, format)?;
        Ok(Self::from(&addr))
    }

    /// `wc:hex` rendering, lowercase.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// URL-safe user-friendly rendering.
    pub fn to_friendly(&self, bounceable: bool, test_only: bool) -> String {
        let addr = StdAddr::from(*self);
        DisplayBase64StdAddr {
            addr: &addr,
            flags: Base64StdAddrFlags {
                testnet: test_only,
                base64_url: true,
                bounceable,
            },
        }
        .to_string()
    }
}

impl From<&StdAddr> for StdAddress {
    fn from(addr: &StdAddr) -> Self {
        Self::new(addr.workchain, addr.address.0)
    }
}

impl From<StdAddress> for StdAddr {
    fn from(addr: StdAddress) -> Self {
        StdAddr::new(addr.workchain, HashBytes(addr.hash))
    }
}

impl FromStr for StdAddress {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s)
        }
    }
}

/// Bounceable mainnet form, the same rendering explorers use.
impl fmt::Display for StdAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_friendly(true, false))
    }
}

impl Serialize for StdAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StdAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
