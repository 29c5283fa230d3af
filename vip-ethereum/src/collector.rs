//! Paginated collection of all scores of a stage.
//!
//! [`PaginatedCollector`] calls a [`ScoreSource`] page by page, starting at offset 0, and merges
//! the accepted entries of every page into a single [`ScoreMap`]. Collection ends with the first
//! page that is empty or holds fewer accepted entries than the page size.

use std::{collections::HashMap, fmt::Debug, num::NonZeroU64};

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use vip_common::{
    models::{ScoreMap, StageId},
    traits::ScoreSource,
};

use crate::abi::{
    score_response::{decode_score_response, is_empty_response},
    DecodeError,
};

/// Default number of entries requested per page.
pub const DEFAULT_PAGE_SIZE: NonZeroU64 = match NonZeroU64::new(500) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Error, Debug)]
pub enum CollectorError<E: Debug> {
    #[error("Remote call failed: {0:?}")]
    RemoteCall(E),
    #[error("Failed to decode score page: {0}")]
    Decode(#[from] DecodeError),
    #[error("Stopped after {0} full pages without reaching the end")]
    PageLimitExceeded(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Number of entries requested per call.
    pub page_size: NonZeroU64,
    /// Upper bound on the number of calls of a single collection. `None` keeps fetching until
    /// the source runs out of entries.
    pub max_pages: Option<usize>,
}

impl CollectorConfig {
    pub fn new(page_size: NonZeroU64, max_pages: Option<usize>) -> Self {
        Self { page_size, max_pages }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE, max_pages: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectorState {
    Fetching { offset: u64 },
    Done,
}

/// Drives a [`ScoreSource`] through all pages of a stage.
///
/// Pages are requested strictly one after the other since each offset depends on the
/// previous page. The collector itself holds no per-run state, so one instance can serve
/// several collections at once.
#[derive(Debug, Clone)]
pub struct PaginatedCollector<S> {
    source: S,
    config: CollectorConfig,
}

impl<S> PaginatedCollector<S>
where
    S: ScoreSource,
{
    pub fn new(source: S) -> Self {
        Self::with_config(source, CollectorConfig::default())
    }

    pub fn with_config(source: S, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collects all scores of `stage`.
    ///
    /// Any remote or decode error aborts the collection, no partial result is returned. An
    /// address that shows up on several pages keeps the score of the last page it was on.
    #[instrument(level = "debug", skip(self), fields(page_size = self.config.page_size.get()))]
    pub async fn collect(&self, stage: StageId) -> Result<ScoreMap, CollectorError<S::Error>> {
        let page_size = self.config.page_size.get();
        let mut scores = HashMap::new();
        let mut pages = 0usize;
        let mut state = CollectorState::Fetching { offset: 0 };

        while let CollectorState::Fetching { offset } = state {
            if let Some(max_pages) = self.config.max_pages {
                if pages >= max_pages {
                    warn!(stage, max_pages, offset, "Page limit reached before the last page");
                    return Err(CollectorError::PageLimitExceeded(max_pages));
                }
            }

            let raw = self
                .source
                .fetch_page(stage, offset, page_size)
                .await
                .map_err(CollectorError::RemoteCall)?;
            pages += 1;

            if is_empty_response(&raw) {
                debug!(offset, "Empty response, no more scores");
                state = CollectorState::Done;
                continue;
            }

            let entries = decode_score_response(&raw)?;
            let accepted = entries.len();
            debug!(offset, accepted, "Fetched score page");

            for entry in entries {
                scores.insert(entry.address, entry.score);
            }

            state = if (accepted as u64) < page_size {
                CollectorState::Done
            } else {
                CollectorState::Fetching { offset: offset.saturating_add(page_size) }
            };
        }

        info!(stage, pages, accounts = scores.len(), "Collected scores");
        Ok(scores)
    }

    /// Collects several stages concurrently. Results are returned in the order of `stages`.
    pub async fn collect_stages(
        &self,
        stages: &[StageId],
    ) -> Vec<Result<ScoreMap, CollectorError<S::Error>>> {
        join_all(
            stages
                .iter()
                .map(|stage| self.collect(*stage)),
        )
        .await
    }
}
