//! Serde adapters for coin amounts.
//!
//! Nanoton values are `u128` and are written as decimal strings. Numbers that
//! wide do not survive buffered deserialization inside tagged enums, and JSON
//! consumers read them as lossy floats.

use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub mod coins {
    use super::*;

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        value
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid coin amount {:?}: {}", value, e)))
    }
}

pub mod coins_opt {
    use super::*;

    pub fn serialize<S>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<u128>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(d)?
            .map(|value| {
                value.parse().map_err(|e| {
                    D::Error::custom(format!("invalid coin amount {:?}: {}", value, e))
                })
            })
            .transpose()
    }
}
