use std::{cmp::Ordering, collections::HashMap};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::serde_primitives::u256_decimal;

/// Hex encoded account address exactly as it was decoded from a contract response,
/// e.g. `0xabcdef0123456789aabbccddeeff001122334455`. The case of the hex digits is
/// preserved, so two spellings of the same account are distinct keys.
pub type ScoreAddress = String;

/// Score of a single account as reported by the score contract.
pub type Score = U256;

/// Scores of all accounts collected over a single stage query.
pub type ScoreMap = HashMap<ScoreAddress, Score>;

/// Identifier of a VIP stage, passed to the score contract as its first argument.
pub type StageId = u64;

/// A single `(address, score)` pair that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedEntry {
    pub address: ScoreAddress,
    /// Rendered in base 10 on serialization, without leading zeros.
    #[serde(with = "u256_decimal")]
    pub score: Score,
}

impl DecodedEntry {
    pub fn new(address: impl Into<ScoreAddress>, score: Score) -> Self {
        Self { address: address.into(), score }
    }
}

/// A score together with its position in a descending ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedScore {
    /// 1-based position, the highest score has rank 1.
    pub rank: usize,
    pub address: ScoreAddress,
    #[serde(with = "u256_decimal")]
    pub score: Score,
}

/// Orders scores from highest to lowest and assigns 1-based ranks.
///
/// Equal scores are ordered by address so the ranking is stable across runs, even though
/// the map itself has no defined iteration order.
pub fn rank_scores(scores: &ScoreMap) -> Vec<RankedScore> {
    let mut entries: Vec<(&ScoreAddress, &Score)> = scores.iter().collect();
    entries.sort_by(|(addr_a, score_a), (addr_b, score_b)| match score_b.cmp(score_a) {
        Ordering::Equal => addr_a.cmp(addr_b),
        ord => ord,
    });

    trace!(count = entries.len(), "Ranked scores");

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (address, score))| RankedScore {
            rank: idx + 1,
            address: address.clone(),
            score: *score,
        })
        .collect()
}

/// Sum of all scores in the map.
pub fn total_score(scores: &ScoreMap) -> Score {
    scores
        .values()
        .fold(U256::ZERO, |acc, score| acc.saturating_add(*score))
}
