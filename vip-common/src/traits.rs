use core::fmt::Debug;

use async_trait::async_trait;

use crate::models::StageId;

/// Trait for fetching a single page of scores from an on-chain score contract.
///
/// Each invocation fetches exactly one logical page. Implementations may retry transient
/// transport failures internally, but must not fetch further pages on behalf of the caller.
#[cfg_attr(feature = "test-utils", mockall::automock(type Error = String;))]
#[async_trait]
pub trait ScoreSource: Send + Sync {
    type Error: Debug + Send + Sync;

    /// Fetches one page of scores.
    ///
    /// # Arguments
    ///
    /// * `stage`: The VIP stage to query scores for.
    /// * `offset`: Number of entries to skip.
    /// * `limit`: Maximum number of entries to return.
    ///
    /// returns: Result<String, Self::Error>
    /// The raw ABI-encoded return value as a `0x` prefixed hex string.
    async fn fetch_page(
        &self,
        stage: StageId,
        offset: u64,
        limit: u64,
    ) -> Result<String, Self::Error>;
}
