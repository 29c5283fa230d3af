use std::time::Duration;

use backoff::{exponential::ExponentialBackoffBuilder, ExponentialBackoff};

use crate::rpc::retry::RetryPolicy;

/// Configuration for RPC provider retry behavior
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RPCRetryConfig {
    /// Maximum number of retry attempts for failed requests (default: 3)
    pub max_retries: usize,
    /// Initial backoff delay in milliseconds (default: 100ms)
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds (default: 5000ms)
    pub max_backoff_ms: u64,
}

impl RPCRetryConfig {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self { max_retries, initial_backoff_ms, max_backoff_ms }
    }

    /// A config that sends every request exactly once.
    pub fn disabled() -> Self {
        Self { max_retries: 0, ..Default::default() }
    }
}

impl Default for RPCRetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, initial_backoff_ms: 100, max_backoff_ms: 5000 }
    }
}

impl From<RPCRetryConfig> for RetryPolicy {
    fn from(config: RPCRetryConfig) -> Self {
        let backoff: ExponentialBackoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(config.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(config.max_backoff_ms))
            // The attempt counter bounds retries, not the wall clock.
            .with_max_elapsed_time(None)
            .build();
        RetryPolicy::new(backoff, config.max_retries)
    }
}

impl From<&RetryPolicy> for RPCRetryConfig {
    fn from(policy: &RetryPolicy) -> Self {
        let backoff = policy.backoff();
        Self {
            max_retries: policy.max_retries(),
            initial_backoff_ms: backoff.initial_interval.as_millis() as u64,
            max_backoff_ms: backoff.max_interval.as_millis() as u64,
        }
    }
}
