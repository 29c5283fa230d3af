//! Conversion between hex account addresses and their `init` bech32 form.
//!
//! Score contracts report accounts as 20-byte hex addresses, while users often know their
//! account by its bech32 spelling. Both encode the same 20 bytes.

use std::str::FromStr;

use bech32::{Bech32, Hrp};
use thiserror::Error;

/// Human readable part of bech32 account addresses.
pub const BECH32_PREFIX: &str = "init";

const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid hex address {0}: expected 0x followed by 40 hex digits")]
    InvalidHex(String),
    #[error("Invalid bech32 address {address}: {reason}")]
    InvalidBech32 { address: String, reason: String },
}

/// Encodes a `0x` prefixed hex address as an `init1...` bech32 address.
pub fn hex_to_bech32(address: &str) -> Result<String, AddressError> {
    let bytes = parse_hex(address)?;
    let hrp = Hrp::parse_unchecked(BECH32_PREFIX);
    bech32::encode::<Bech32>(hrp, &bytes).map_err(|e| AddressError::InvalidBech32 {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Decodes an `init1...` bech32 address into a lowercase `0x` prefixed hex address.
pub fn bech32_to_hex(address: &str) -> Result<String, AddressError> {
    let invalid = |reason: String| AddressError::InvalidBech32 {
        address: address.to_string(),
        reason,
    };
    let (hrp, bytes) = bech32::decode(address).map_err(|e| invalid(e.to_string()))?;
    if hrp.to_lowercase() != BECH32_PREFIX {
        return Err(invalid(format!("expected prefix {BECH32_PREFIX}")));
    }
    if bytes.len() != ADDRESS_LEN {
        return Err(invalid(format!("expected {ADDRESS_LEN} bytes, got {}", bytes.len())));
    }
    Ok(format!("0x{}", hex::encode(bytes)))
}

fn parse_hex(address: &str) -> Result<Vec<u8>, AddressError> {
    let digits = address
        .strip_prefix("0x")
        .ok_or_else(|| AddressError::InvalidHex(address.to_string()))?;
    match hex::decode(digits) {
        Ok(bytes) if bytes.len() == ADDRESS_LEN => Ok(bytes),
        _ => Err(AddressError::InvalidHex(address.to_string())),
    }
}

/// An account to look up among collected scores, given in either address form.
///
/// Stored as lowercase hex, so matching ignores the case the contract reported the address in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    hex: String,
}

impl AddressQuery {
    /// The queried account as lowercase `0x` prefixed hex.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Whether `address`, a hex address as decoded from a score response, is the queried account.
    pub fn matches(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(&self.hex)
    }
}

impl FromStr for AddressQuery {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = if s
            .to_ascii_lowercase()
            .starts_with(BECH32_PREFIX)
        {
            bech32_to_hex(s)?
        } else {
            parse_hex(s)?;
            s.to_ascii_lowercase()
        };
        Ok(Self { hex })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    const HEX: &str = "0xabcdef0123456789aabbccddeeff001122334455";
    const BECH32: &str = "init140x77qfrg4ncn24menw7alcqzy3rx3z4z099d5";

    #[test]
    fn test_hex_to_bech32() {
        assert_eq!(hex_to_bech32(HEX).unwrap(), BECH32);
        assert_eq!(
            hex_to_bech32("0x1111111111111111111111111111111111111111").unwrap(),
            "init1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg30th3ed"
        );
    }

    #[test]
    fn test_bech32_to_hex() {
        assert_eq!(bech32_to_hex(BECH32).unwrap(), HEX);
    }

    #[test]
    fn test_mixed_case_hex_converts() {
        let mixed = "0xAbCdEf0123456789aAbBcCdDeEfF001122334455";

        assert_eq!(hex_to_bech32(mixed).unwrap(), BECH32);
    }

    #[rstest]
    #[case::other_prefix("cosmos1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3pahzj0")]
    #[case::bad_checksum("init140x77qfrg4ncn24menw7alcqzy3rx3z4z099d6")]
    #[case::garbage("init1")]
    fn test_bech32_to_hex_rejects(#[case] address: &str) {
        assert!(matches!(bech32_to_hex(address), Err(AddressError::InvalidBech32 { .. })));
    }

    #[rstest]
    #[case::no_prefix("abcdef0123456789aabbccddeeff001122334455")]
    #[case::short("0xabcdef")]
    #[case::not_hex("0xzzcdef0123456789aabbccddeeff001122334455")]
    fn test_invalid_hex_rejected(#[case] address: &str) {
        assert!(matches!(hex_to_bech32(address), Err(AddressError::InvalidHex(_))));
        assert!(address.parse::<AddressQuery>().is_err());
    }

    #[test]
    fn test_query_from_hex_ignores_case() {
        let query: AddressQuery = "0xABCDEF0123456789AABBCCDDEEFF001122334455"
            .parse()
            .unwrap();

        assert_eq!(query.hex(), HEX);
        assert!(query.matches("0xAbCdEf0123456789aAbBcCdDeEfF001122334455"));
        assert!(!query.matches("0x1111111111111111111111111111111111111111"));
    }

    #[test]
    fn test_query_from_bech32() {
        let query: AddressQuery = BECH32.parse().unwrap();

        assert_eq!(query.hex(), HEX);
        assert!(query.matches("0xAbCdEf0123456789aAbBcCdDeEfF001122334455"));
    }
}
