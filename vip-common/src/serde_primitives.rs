//! Serde helpers for primitive types that need a custom wire representation.

/// Serializes a `U256` as a base-10 string.
///
/// The default `U256` representation is a `0x` prefixed hex string, which is not what
/// consumers of score tables expect.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10).map_err(de::Error::custom)
    }
}
