//! RPC retry logic and error classification
//!
//! This module contains retry logic for RPC requests, including exponential backoff
//! and error classification to determine which errors should be retried.

use std::time::Duration;

use alloy::{
    rpc::json_rpc::ErrorPayload,
    transports::{RpcError, TransportErrorKind},
};
use backoff::ExponentialBackoff;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::debug;

/// Extension trait to implement retry logic for [`RpcError<TransportErrorKind>`].
///
/// # Attribution
/// Adapted from alloy-transport:
/// https://github.com/alloy-rs/alloy/blob/a3899575fbc0c789275f95661516b99e9a92838d/crates/transport/src/error.rs#L156
/// License: MIT OR Apache-2.0
pub(crate) trait RpcErrorExt {
    /// Analyzes whether to retry the request depending on the error.
    ///
    /// Returns `true` for transient errors that are likely to succeed on retry:
    /// - Rate limiting (429) errors
    /// - Service unavailable (503) errors
    /// - Null responses
    /// - Certain JSON-RPC error codes
    ///
    /// Returns `false` for permanent errors, e.g. reverts or malformed requests.
    fn is_retryable(&self) -> bool;

    /// Fetches the backoff hint from the error message if present.
    ///
    /// Some RPC providers include a suggested backoff duration in their rate limit error
    /// responses under `data.rate.backoff_seconds`.
    fn backoff_hint(&self) -> Option<Duration>;

    /// Classifies errors into transient or permanent for backoff retry logic.
    fn classify_error(self) -> backoff::Error<Self>
    where
        Self: Sized;
}

impl<E: std::borrow::Borrow<RawValue>> RpcErrorExt for RpcError<TransportErrorKind, E> {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retry_err(),
            Self::SerError(_) => false,
            Self::DeserError { text, .. } => {
                if let Ok(resp) = serde_json::from_str::<ErrorPayload>(text) {
                    return resp.is_retry_err();
                }

                // some providers send invalid JSON RPC in the error case (no `id:u64`), but the
                // text should be a `JsonRpcError`
                #[derive(Deserialize)]
                struct Resp {
                    error: ErrorPayload,
                }

                if let Ok(resp) = serde_json::from_str::<Resp>(text) {
                    return resp.error.is_retry_err();
                }

                false
            }
            Self::ErrorResp(err) => err.is_retry_err(),
            Self::NullResp => true,
            _ => false,
        }
    }

    fn backoff_hint(&self) -> Option<Duration> {
        if let Self::ErrorResp(resp) = self {
            let data = resp.try_data_as::<serde_json::Value>();
            if let Some(Ok(data)) = data {
                let backoff_seconds = &data["rate"]["backoff_seconds"];
                if let Some(seconds) = backoff_seconds.as_u64() {
                    return Some(Duration::from_secs(seconds));
                }
                // round fractional hints up
                if let Some(seconds) = backoff_seconds.as_f64() {
                    return Some(Duration::from_secs(seconds.ceil() as u64));
                }
            }
        }
        None
    }

    fn classify_error(self) -> backoff::Error<Self> {
        if self.is_retryable() {
            if let Some(hint) = self.backoff_hint() {
                backoff::Error::retry_after(self, hint)
            } else {
                backoff::Error::transient(self)
            }
        } else {
            backoff::Error::permanent(self)
        }
    }
}

/// Exponential backoff together with an upper bound on the number of retries.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    backoff: ExponentialBackoff,
    max_retries: usize,
}

impl RetryPolicy {
    pub fn new(backoff: ExponentialBackoff, max_retries: usize) -> Self {
        Self { backoff, max_retries }
    }

    /// Creates a retry policy optimized for testing (very short intervals).
    #[cfg(test)]
    pub(crate) fn for_testing(max_retries: usize) -> Self {
        let backoff = backoff::exponential::ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(1))
            .with_multiplier(1.1)
            .with_max_interval(Duration::from_millis(5))
            .with_max_elapsed_time(None)
            .build();

        Self { backoff, max_retries }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub(crate) fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// Executes an RPC request with automatic retry on transient failures.
    ///
    /// The operation is attempted at most `max_retries + 1` times. Permanent errors are
    /// returned immediately, the last transient error is returned once retries run out.
    pub(crate) async fn retry_request<F, Fut, T>(
        &self,
        mut operation: F,
    ) -> Result<T, RpcError<TransportErrorKind>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempt = 0usize;

        backoff::future::retry(self.backoff.clone(), || {
            attempt += 1;
            let exhausted = attempt >= max_attempts;
            let current_attempt = attempt;
            let fut = operation();
            async move {
                fut.await.map_err(|err| {
                    if exhausted {
                        backoff::Error::permanent(err)
                    } else {
                        debug!(attempt = current_attempt, error = %err, "RPC request failed");
                        err.classify_error()
                    }
                })
            }
        })
        .await
    }
}
