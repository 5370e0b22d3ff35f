//! Typed TVM stack values.

use std::fmt;
use std::str::FromStr;

use everscale_types::models::StdAddr;
use everscale_types::prelude::{Boc, Cell, CellBuilder, Load};
use num_bigint::BigInt;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use ton_replay_types::StdAddress;

/// TVM keeps at most this many elements in a tuple.
pub const MAX_TUPLE_LEN: usize = 255;

/// Integer stack entries are signed 257-bit.
const INT_BITS: u64 = 256;

/// Width of a serialized `addr_std` without anycast.
pub const STD_ADDRESS_BITS: u32 = 267;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackValue {
    Integer(BigInt),
    /// Hex bag of cells. Continuations are kept as their code cell.
    Cell(String),
    Slice {
        /// Canonical hex of the underlying cell.
        cell: String,
        /// Bit window `start..end` still readable.
        bits: (u32, u32),
        /// Reference window `start..end` still readable.
        refs: (u8, u8),
    },
    Builder {
        /// Stored bits, zero-padded to whole bytes.
        data: String,
        bit_len: u32,
    },
    Address(StdAddress),
    Null,
    Tuple(Vec<StackValue>),
    /// A token no rule accepted, kept verbatim.
    Unparsed { raw: String, reason: String },
}

impl StackValue {
    pub fn unparsed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        StackValue::Unparsed {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Parse a bare integer literal, rejecting values outside the 257-bit
    /// signed range.
    pub fn integer(raw: &str) -> Self {
        match BigInt::from_str(raw) {
            Ok(value) if value.bits() <= INT_BITS || value == -(BigInt::from(1u8) << INT_BITS) => {
                StackValue::Integer(value)
            }
            Ok(_) => StackValue::unparsed(raw, "integer outside the 257-bit range"),
            Err(_) => StackValue::unparsed(raw, "unknown stack element"),
        }
    }

    /// `C{...}` and `Cont{...}` payloads.
    pub fn cell(raw: &str, boc_hex: &str) -> Self {
        let decoded = hex::decode(boc_hex)
            .map_err(|e| e.to_string())
            .and_then(|bytes| Boc::decode(&bytes).map(|_| ()).map_err(|e| e.to_string()));
        match decoded {
            Ok(()) => StackValue::Cell(boc_hex.to_string()),
            Err(reason) => StackValue::unparsed(raw, format!("bad cell: {}", reason)),
        }
    }

    /// `BC{...}` payload in canonical cell form.
    pub fn builder(raw: &str, canonical_hex: &str) -> Self {
        match CanonicalCell::decode(canonical_hex) {
            Ok(cell) => StackValue::Builder {
                data: hex::encode(&cell.data),
                bit_len: cell.bit_len,
            },
            Err(reason) => StackValue::unparsed(raw, format!("bad builder: {}", reason)),
        }
    }

    /// `CS{Cell{...} bits: a..b; refs: c..d}`. A 267-bit window holding a
    /// standard address becomes [`StackValue::Address`].
    pub fn slice(raw: &str, canonical_hex: &str, bits: (u32, u32), refs: (u8, u8)) -> Self {
        let cell = match CanonicalCell::decode(canonical_hex) {
            Ok(cell) => cell,
            Err(reason) => return StackValue::unparsed(raw, format!("bad slice: {}", reason)),
        };
        if bits.0 > bits.1 || bits.1 > cell.bit_len || refs.0 > refs.1 || refs.1 > cell.refs {
            return StackValue::unparsed(raw, "slice window exceeds its cell");
        }
        if bits.1 - bits.0 == STD_ADDRESS_BITS {
            if let Some(address) = cell.std_address_at(bits.0) {
                return StackValue::Address(address);
            }
        }
        StackValue::Slice {
            cell: canonical_hex.to_string(),
            bits,
            refs,
        }
    }
}

// =============================================================================
// Canonical cell form
// =============================================================================

/// A cell printed as `d1 d2 data` in hex, where the data of a cell whose bit
/// length is not a multiple of 8 ends in a completion tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CanonicalCell {
    pub data: Vec<u8>,
    pub bit_len: u32,
    pub refs: u8,
}

impl CanonicalCell {
    pub fn decode(canonical_hex: &str) -> Result<Self, String> {
        let bytes = hex::decode(canonical_hex).map_err(|e| e.to_string())?;
        let [d1, d2, rest @ ..] = bytes.as_slice() else {
            return Err("missing descriptor bytes".to_string());
        };
        let refs = d1 & 0b111;
        let data_len = (*d2 as usize + 1) / 2;
        if rest.len() != data_len {
            return Err(format!("expected {} data bytes, found {}", data_len, rest.len()));
        }
        let mut data = rest.to_vec();

        let bit_len = if d2 % 2 == 0 {
            data_len as u32 * 8
        } else {
            // the lowest set bit of the last byte is the completion tag
            let last = data.last().copied().unwrap_or(0);
            if last == 0 {
                return Err("missing completion tag".to_string());
            }
            let tag_pos = last.trailing_zeros();
            if let Some(byte) = data.last_mut() {
                *byte &= !(1u8 << tag_pos);
            }
            (data_len as u32 - 1) * 8 + (7 - tag_pos)
        };

        Ok(Self {
            data,
            bit_len,
            refs,
        })
    }

    fn to_cell(&self) -> Result<Cell, everscale_types::error::Error> {
        let mut builder = CellBuilder::new();
        builder.store_raw(&self.data, self.bit_len as u16)?;
        builder.build()
    }

    /// `addr_std$10 anycast:nothing workchain:int8 hash:bits256` at `offset`.
    pub fn std_address_at(&self, offset: u32) -> Option<StdAddress> {
        if offset + STD_ADDRESS_BITS > self.bit_len {
            return None;
        }
        let cell = self.to_cell().ok()?;
        let mut slice = cell.as_slice().ok()?;
        slice.skip_first(offset as u16, 0).ok()?;
        let addr = StdAddr::load_from(&mut slice).ok()?;
        addr.anycast.is_none().then(|| StdAddress::from(&addr))
    }
}

// =============================================================================
// Rendering
// =============================================================================

impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackValue::Integer(value) => write!(f, "{}", value),
            StackValue::Cell(boc) => write!(f, "C{{{}}}", boc),
            StackValue::Slice { cell, bits, refs } => write!(
                f,
                "CS{{Cell{{{}}} bits: {}..{}; refs: {}..{}}}",
                cell, bits.0, bits.1, refs.0, refs.1
            ),
            StackValue::Builder { data, bit_len } => write!(f, "BC{{{} ({} bits)}}", data, bit_len),
            StackValue::Address(address) => write!(f, "{}", address),
            StackValue::Null => write!(f, "()"),
            StackValue::Tuple(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            StackValue::Unparsed { raw, .. } => write!(f, "{}", raw),
        }
    }
}

struct Items<'a>(&'a [StackValue]);

impl Serialize for Items<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for item in self.0 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl Serialize for StackValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            StackValue::Integer(value) => {
                map.serialize_entry("type", "int")?;
                map.serialize_entry("value", &value.to_string())?;
            }
            StackValue::Cell(boc) => {
                map.serialize_entry("type", "cell")?;
                map.serialize_entry("boc", boc)?;
            }
            StackValue::Slice { cell, bits, refs } => {
                map.serialize_entry("type", "slice")?;
                map.serialize_entry("cell", cell)?;
                map.serialize_entry("bits", &[bits.0, bits.1])?;
                map.serialize_entry("refs", &[refs.0, refs.1])?;
            }
            StackValue::Builder { data, bit_len } => {
                map.serialize_entry("type", "builder")?;
                map.serialize_entry("data", data)?;
                map.serialize_entry("bits", bit_len)?;
            }
            StackValue::Address(address) => {
                map.serialize_entry("type", "address")?;
                map.serialize_entry("value", &address.to_string())?;
                map.serialize_entry("raw", &address.to_raw())?;
            }
            StackValue::Null => {
                map.serialize_entry("type", "null")?;
            }
            StackValue::Tuple(items) => {
                map.serialize_entry("type", "tuple")?;
                map.serialize_entry("items", &Items(items))?;
            }
            StackValue::Unparsed { raw, reason } => {
                map.serialize_entry("type", "unparsed")?;
                map.serialize_entry("raw", raw)?;
                map.serialize_entry("reason", reason)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS_CELL: &str =
        "0043801b5c2a74e9b12977864e903319ac4dc9ebbe94d35a5f4ad9d01f84c896ae11a410";

    #[test]
    fn test_integer_range() {
        let max: BigInt = (BigInt::from(1u8) << 256u32) - 1u8;
        let min: BigInt = -(BigInt::from(1u8) << 256u32);
        assert_eq!(StackValue::integer(&max.to_string()), StackValue::Integer(max.clone()));
        assert_eq!(StackValue::integer(&min.to_string()), StackValue::Integer(min.clone()));
        assert!(matches!(
            StackValue::integer(&(max + 1u8).to_string()),
            StackValue::Unparsed { .. }
        ));
        assert!(matches!(
            StackValue::integer(&(min - 1u8).to_string()),
            StackValue::Unparsed { .. }
        ));
        assert!(matches!(StackValue::integer("NaN"), StackValue::Unparsed { .. }));
        assert_eq!(StackValue::integer("-17"), StackValue::Integer(BigInt::from(-17)));
    }

    #[test]
    fn test_canonical_cell_with_completion_tag() {
        // 267 bits: 33 full bytes plus 3 bits and the tag
        let cell = CanonicalCell::decode(ADDRESS_CELL).unwrap();
        assert_eq!(cell.bit_len, 267);
        assert_eq!(cell.refs, 0);
        assert_eq!(cell.data.len(), 34);
    }

    #[test]
    fn test_canonical_cell_whole_bytes() {
        let cell = CanonicalCell::decode("0004abcd").unwrap();
        assert_eq!(cell.bit_len, 16);
        assert_eq!(cell.data, vec![0xab, 0xcd]);

        let cell = CanonicalCell::decode("0001a0").unwrap();
        assert_eq!(cell.bit_len, 2);
        assert_eq!(cell.data, vec![0x80]);

        assert!(CanonicalCell::decode("0003ab").is_err());
        assert!(CanonicalCell::decode("00").is_err());
    }

    #[test]
    fn test_address_slice() {
        let value = StackValue::slice("raw", ADDRESS_CELL, (0, 267), (0, 0));
        let expected: StdAddress = "EQDa4VOnTYlLvDJ0gZjNYm5PXfSmmtL6Vs6A_CZEtXCNICq_".parse().unwrap();
        assert_eq!(value, StackValue::Address(expected));
    }

    #[test]
    fn test_non_std_tag_stays_slice() {
        // same bits with an addr_var tag in front
        let cell = ADDRESS_CELL.replacen("0043801b", "0043c01b", 1);
        let value = StackValue::slice("raw", &cell, (0, 267), (0, 0));
        assert!(matches!(value, StackValue::Slice { bits: (0, 267), .. }));
    }

    #[test]
    fn test_narrower_window_stays_slice() {
        let value = StackValue::slice("raw", ADDRESS_CELL, (4, 267), (0, 0));
        assert!(matches!(value, StackValue::Slice { bits: (4, 267), .. }));
    }

    #[test]
    fn test_window_outside_cell() {
        let value = StackValue::slice("raw", ADDRESS_CELL, (0, 300), (0, 0));
        assert!(matches!(value, StackValue::Unparsed { .. }));
    }

    #[test]
    fn test_json_shape() {
        let value = StackValue::Tuple(vec![
            StackValue::Integer(BigInt::from(5)),
            StackValue::Null,
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "tuple");
        assert_eq!(json["items"][0]["value"], "5");
        assert_eq!(json["items"][1]["type"], "null");
    }
}
