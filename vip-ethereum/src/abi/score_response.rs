//! Decoder for the return value of `getScores(uint256,uint256,uint256)`.
//!
//! The contract returns a dynamic array of structs:
//!
//! ```solidity
//! struct ScoreResponse {
//!     address addr;
//!     uint64 amount;
//!     uint64 index;
//! }
//! ```
//!
//! Encoded as a single dynamic return value this is a head word holding the byte offset of the
//! array, a length word at that offset, and `length` elements of three words each right after
//! the length word.

use std::iter::FusedIterator;

use alloy::primitives::U256;
use tracing::{debug, trace};
use vip_common::models::DecodedEntry;

use crate::abi::{AbiCursor, DecodeError, WORD_SIZE};

/// Size of one encoded `ScoreResponse` element: address, amount and index words.
pub const ELEMENT_SIZE: usize = 3 * WORD_SIZE;

/// Minimum number of non-`'0'` hex digits an address needs to be accepted.
pub const MIN_NON_ZERO_ADDRESS_DIGITS: usize = 4;

/// A decoded element, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreStruct {
    pub address: String,
    pub amount: U256,
    /// Rank of the entry within the contract. Not part of the collected output.
    pub index: U256,
}

impl ScoreStruct {
    /// Decodes a single 96 byte element.
    pub fn decode(element: &AbiCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            address: element.read_address(0)?,
            amount: element.read_uint256(WORD_SIZE)?,
            index: element.read_uint256(2 * WORD_SIZE)?,
        })
    }

    /// Converts the element into an output entry if it passes [`is_plausible_entry`].
    pub fn into_entry(self) -> Option<DecodedEntry> {
        if is_plausible_entry(&self.address, &self.amount) {
            Some(DecodedEntry::new(self.address, self.amount))
        } else {
            trace!(address = %self.address, score = %self.amount, "Skipping score entry");
            None
        }
    }
}

/// Heuristic filter against the zero-filled padding entries some score contracts return.
///
/// An entry is kept if its score is non-zero and its address has at least
/// [`MIN_NON_ZERO_ADDRESS_DIGITS`] hex digits other than `'0'`. This is lossy in both
/// directions: real addresses with very few non-zero digits are dropped, and garbage with a
/// few set digits is kept. It is not an address validity check.
pub fn is_plausible_entry(address: &str, score: &U256) -> bool {
    let digits = address
        .strip_prefix("0x")
        .unwrap_or(address);
    let non_zero_count = digits
        .chars()
        .filter(|c| *c != '0')
        .count();
    non_zero_count >= MIN_NON_ZERO_ADDRESS_DIGITS && !score.is_zero()
}

/// Lazily yields the raw elements of an encoded `ScoreResponse[]`.
///
/// Elements that would extend past the end of the data end the iteration silently, so a
/// truncated response produces the elements that are fully present instead of an error.
#[derive(Debug)]
pub struct ScoreEntries<'a> {
    data: AbiCursor<'a>,
    elements_start: usize,
    declared_len: usize,
    next: usize,
}

impl<'a> ScoreEntries<'a> {
    /// Reads the array header of `raw`.
    ///
    /// Fails if the head word or the length word cannot be read. An array with length 0 is
    /// valid and yields nothing.
    pub fn new(raw: &'a str) -> Result<Self, DecodeError> {
        let data = AbiCursor::new(raw)?;
        let array_offset = data.read_usize(0)?;
        let declared_len = data.read_usize(array_offset)?;
        let elements_start = array_offset
            .checked_add(WORD_SIZE)
            .ok_or_else(|| DecodeError::Overflow(format!("array offset {array_offset}")))?;

        debug!(array_offset, declared_len, "Decoding score response");

        Ok(Self { data, elements_start, declared_len, next: 0 })
    }

    /// Number of elements announced by the length word. May exceed the number of elements
    /// actually present.
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }
}

impl<'a> Iterator for ScoreEntries<'a> {
    type Item = AbiCursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.declared_len {
            return None;
        }

        let element = self
            .next
            .checked_mul(ELEMENT_SIZE)
            .and_then(|rel| rel.checked_add(self.elements_start))
            .and_then(|offset| self.data.slice(offset, ELEMENT_SIZE).ok());

        match element {
            Some(element) => {
                self.next += 1;
                Some(element)
            }
            None => {
                debug!(
                    decoded = self.next,
                    declared = self.declared_len,
                    "Score response truncated, stopping early"
                );
                self.next = self.declared_len;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.declared_len - self.next))
    }
}

impl FusedIterator for ScoreEntries<'_> {}

/// Decodes a `getScores` return value into the entries that pass [`is_plausible_entry`].
pub fn decode_score_response(raw: &str) -> Result<Vec<DecodedEntry>, DecodeError> {
    let mut entries = Vec::new();
    for element in ScoreEntries::new(raw)? {
        if let Some(entry) = ScoreStruct::decode(&element)?.into_entry() {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Returns true for the empty return data a node sends when a call produced no output.
pub fn is_empty_response(raw: &str) -> bool {
    raw.strip_prefix("0x")
        .unwrap_or(raw)
        .is_empty()
}
