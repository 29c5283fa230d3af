//! Bounds-checked reader over ABI-encoded return data.
//!
//! Contract return values arrive as `0x` prefixed hex strings. [`AbiCursor`] reads fixed-size
//! 32-byte words out of such a string at byte offsets without first copying it into a byte
//! buffer, so values like addresses can be returned exactly as the node spelled them.

pub mod score_response;

use alloy::primitives::U256;
use thiserror::Error;

/// Size of an ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// Number of leading padding bytes in front of an address inside its word.
const ADDRESS_PADDING: usize = 12;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Read of {needed} bytes at offset {offset} exceeds the {available} available bytes")]
    OutOfBounds { offset: usize, needed: usize, available: usize },
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),
    #[error("Value does not fit the target type: {0}")]
    Overflow(String),
}

/// A view over hex encoded ABI data. All offsets are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiCursor<'a> {
    hex: &'a str,
}

impl<'a> AbiCursor<'a> {
    /// Creates a cursor over `data`, with or without a `0x` prefix.
    ///
    /// Fails if the data contains anything but hex digits. A trailing odd nibble is ignored by
    /// all reads.
    pub fn new(data: &'a str) -> Result<Self, DecodeError> {
        let hex = data.strip_prefix("0x").unwrap_or(data);
        if let Some(pos) = hex.find(|c: char| !c.is_ascii_hexdigit()) {
            return Err(DecodeError::InvalidHex(format!(
                "unexpected character at position {pos} in {}",
                truncate(data)
            )));
        }
        Ok(Self { hex })
    }

    /// Number of whole bytes available from `byte_offset` to the end of the data.
    pub fn remaining_bytes(&self, byte_offset: usize) -> usize {
        (self.hex.len() / 2).saturating_sub(byte_offset)
    }

    /// Total number of whole bytes in the data.
    pub fn len(&self) -> usize {
        self.hex.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a cursor over `len` bytes starting at `byte_offset`. Offsets of the returned
    /// cursor are relative to `byte_offset`.
    pub fn slice(&self, byte_offset: usize, len: usize) -> Result<AbiCursor<'a>, DecodeError> {
        self.hex_range(byte_offset, len)
            .map(|hex| AbiCursor { hex })
    }

    /// Reads the 32-byte word at `byte_offset` as a big-endian unsigned integer.
    pub fn read_uint256(&self, byte_offset: usize) -> Result<U256, DecodeError> {
        let word = self.hex_range(byte_offset, WORD_SIZE)?;
        U256::from_str_radix(word, 16).map_err(|e| DecodeError::InvalidHex(e.to_string()))
    }

    /// Reads the 32-byte word at `byte_offset` as an offset or length.
    pub fn read_usize(&self, byte_offset: usize) -> Result<usize, DecodeError> {
        let value = self.read_uint256(byte_offset)?;
        usize::try_from(value)
            .map_err(|_| DecodeError::Overflow(format!("word {value} at offset {byte_offset}")))
    }

    /// Reads the address stored in the word at `byte_offset`.
    ///
    /// The 12 padding bytes are skipped and the remaining 20 bytes are returned as `0x`
    /// followed by 40 hex digits, in the same case as the input.
    pub fn read_address(&self, byte_offset: usize) -> Result<String, DecodeError> {
        let word = self.hex_range(byte_offset, WORD_SIZE)?;
        Ok(format!("0x{}", &word[ADDRESS_PADDING * 2..]))
    }

    fn hex_range(&self, byte_offset: usize, len: usize) -> Result<&'a str, DecodeError> {
        let out_of_bounds = || DecodeError::OutOfBounds {
            offset: byte_offset,
            needed: len,
            available: self.remaining_bytes(byte_offset),
        };
        let end = byte_offset
            .checked_add(len)
            .ok_or_else(out_of_bounds)?;
        if end > self.len() {
            return Err(out_of_bounds());
        }
        Ok(&self.hex[byte_offset * 2..end * 2])
    }
}

fn truncate(data: &str) -> String {
    const MAX: usize = 20;
    match data.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &data[..idx]),
        None => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const ADDRESS_WORD: &str = "000000000000000000000000AbCdEf0123456789aAbBcCdDeEfF001122334455";

    fn word(value: u64) -> String {
        format!("{value:064x}")
    }

    #[test]
    fn test_read_uint256() {
        let data = format!("0x{}{}", word(0x20), word(1000));
        let cursor = AbiCursor::new(&data).unwrap();

        assert_eq!(cursor.read_uint256(0).unwrap(), U256::from(0x20));
        assert_eq!(cursor.read_uint256(32).unwrap(), U256::from(1000));
    }

    #[test]
    fn test_read_uint256_max() {
        let data = "f".repeat(64);
        let cursor = AbiCursor::new(&data).unwrap();

        assert_eq!(cursor.read_uint256(0).unwrap(), U256::MAX);
    }

    #[rstest]
    #[case::empty("0x", 0)]
    #[case::short_word("0x0102", 0)]
    #[case::past_end(&format!("0x{}", word(1)), 1)]
    fn test_read_uint256_out_of_bounds(#[case] data: &str, #[case] offset: usize) {
        let cursor = AbiCursor::new(data).unwrap();

        let err = cursor.read_uint256(offset).unwrap_err();

        assert!(matches!(err, DecodeError::OutOfBounds { needed: 32, .. }), "{err:?}");
    }

    #[test]
    fn test_read_usize_overflow() {
        let data = "f".repeat(64);
        let cursor = AbiCursor::new(&data).unwrap();

        assert!(matches!(cursor.read_usize(0), Err(DecodeError::Overflow(_))));
    }

    #[test]
    fn test_read_address_preserves_case() {
        let data = format!("0x{ADDRESS_WORD}");
        let cursor = AbiCursor::new(&data).unwrap();

        assert_eq!(cursor.read_address(0).unwrap(), "0xAbCdEf0123456789aAbBcCdDeEfF001122334455");
    }

    #[test]
    fn test_remaining_bytes() {
        let data = format!("0x{}{}", word(1), word(2));
        let cursor = AbiCursor::new(&data).unwrap();

        assert_eq!(cursor.remaining_bytes(0), 64);
        assert_eq!(cursor.remaining_bytes(40), 24);
        assert_eq!(cursor.remaining_bytes(100), 0);
    }

    #[test]
    fn test_slice_offsets_are_relative() {
        let data = format!("{}{}{}", word(1), word(2), word(3));
        let cursor = AbiCursor::new(&data).unwrap();

        let slice = cursor.slice(32, 64).unwrap();

        assert_eq!(slice.len(), 64);
        assert_eq!(slice.read_uint256(0).unwrap(), U256::from(2));
        assert_eq!(slice.read_uint256(32).unwrap(), U256::from(3));
        assert!(slice.read_uint256(64).is_err());
    }

    #[test]
    fn test_odd_trailing_nibble_is_ignored() {
        let data = format!("{}f", word(7));
        let cursor = AbiCursor::new(&data).unwrap();

        assert_eq!(cursor.len(), 32);
        assert_eq!(cursor.read_uint256(0).unwrap(), U256::from(7));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let err = AbiCursor::new("0x00zz").unwrap_err();

        assert!(matches!(err, DecodeError::InvalidHex(_)));
    }
}
