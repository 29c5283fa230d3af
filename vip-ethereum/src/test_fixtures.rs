//! Common test fixtures and utilities for vip-ethereum tests
//!
//! Builders for synthetic `getScores` return values, so decoder and collector tests don't need
//! a node.

use alloy::primitives::{ruint::UintTryFrom, U256};

use crate::abi::WORD_SIZE;

pub const ZERO_ADDRESS_HEX: &str = "0000000000000000000000000000000000000000";
pub const SCORE_CONTRACT_STR: &str = "0x6f3fb11a2b1f4b9d6c6e3f2f1e95f9a14b3e8d21";

/// One element of an encoded score response.
#[derive(Debug, Clone)]
pub struct ScoreFixture {
    /// 40 hex digits, without `0x`.
    pub address: String,
    pub amount: U256,
    pub index: U256,
}

impl ScoreFixture {
    pub fn new<T>(address: &str, amount: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        assert_eq!(address.len(), 40, "fixture address must be 20 bytes");
        Self { address: address.to_string(), amount: U256::from(amount), index: U256::ZERO }
    }
}

fn encode_word(value: U256) -> String {
    hex::encode(value.to_be_bytes::<WORD_SIZE>())
}

/// ABI-encodes `entries` as a single `ScoreResponse[]` return value.
///
/// `declared_len` overrides the length word, which allows building responses that announce
/// more elements than they contain.
pub fn encode_score_response(entries: &[ScoreFixture], declared_len: Option<usize>) -> String {
    let mut out = String::from("0x");
    out.push_str(&encode_word(U256::from(WORD_SIZE)));
    out.push_str(&encode_word(U256::from(declared_len.unwrap_or(entries.len()))));
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&"0".repeat(24));
        out.push_str(&entry.address);
        out.push_str(&encode_word(entry.amount));
        let index = if entry.index.is_zero() { U256::from(i) } else { entry.index };
        out.push_str(&encode_word(index));
    }
    out
}

/// A 40 digit address with exactly `non_zero` digits set to `'1'`, the rest `'0'`.
pub fn address_with_digits(non_zero: usize) -> String {
    format!("{}{}", "0".repeat(40 - non_zero), "1".repeat(non_zero))
}

/// `count` distinct fixtures starting at `first`. Every address keeps the `1111` prefix
/// digits, so all of them pass the sparse address filter.
pub fn page_of(first: usize, count: usize, score: u64) -> Vec<ScoreFixture> {
    (first..first + count)
        .map(|i| ScoreFixture::new(&format!("{:040x}", 0x1111_0000usize + i), score))
        .collect()
}
