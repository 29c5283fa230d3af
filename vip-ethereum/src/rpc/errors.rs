use std::fmt::Display;

use alloy::transports::{RpcError as AlloyRpcError, TransportErrorKind};

use crate::errors::{RPCError, ReqwestError, RequestError};

/// Alloy RPC error type alias for convenience.
pub(crate) type AlloyError = AlloyRpcError<TransportErrorKind>;

/// Substrings nodes put into the JSON-RPC error message when an `eth_call` reverts.
const REVERT_MARKERS: [&str; 2] = ["revert", "EVMCall failed"];

impl RPCError {
    pub(crate) fn from_alloy<S: ToString>(msg: S, error: AlloyError) -> Self {
        if let AlloyRpcError::ErrorResp(payload) = &error {
            if REVERT_MARKERS
                .iter()
                .any(|marker| payload.message.contains(marker))
            {
                return RPCError::Reverted(format!("{}: {}", msg.to_string(), payload.message));
            }
        }
        RPCError::RequestError(RequestError::Reqwest(ReqwestError {
            msg: msg.to_string(),
            source: error,
        }))
    }
}

/// Extension trait for adding RPC context to Results containing Alloy errors.
///
/// Similar to `anyhow::Context`, this trait provides ergonomic error wrapping
/// that converts Alloy RPC errors into `RPCError` with contextual messages.
pub(crate) trait RpcResultExt<T> {
    /// Wraps the error with lazily-evaluated context.
    /// Use this when the context message is expensive to compute.
    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError>;
}

impl<T> RpcResultExt<T> for Result<T, AlloyError> {
    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError> {
        self.map_err(|e| RPCError::from_alloy(f().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use alloy::rpc::json_rpc::ErrorPayload;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::execution_reverted("execution reverted")]
    #[case::cosmos_evm("EVMCall failed: out of gas")]
    fn test_revert_errors_are_classified(#[case] message: &'static str) {
        let payload = ErrorPayload { code: 3, message: message.into(), data: None };
        let res: Result<(), AlloyError> = Err(AlloyRpcError::ErrorResp(payload));

        let err = res
            .with_rpc_context(|| "Failed to call score contract")
            .unwrap_err();

        assert!(matches!(err, RPCError::Reverted(ref msg) if msg.contains(message)));
    }

    #[test]
    fn test_other_errors_keep_source() {
        let payload = ErrorPayload { code: -32000, message: "header not found".into(), data: None };
        let res: Result<(), AlloyError> = Err(AlloyRpcError::ErrorResp(payload));

        let err = res
            .with_rpc_context(|| format!("Failed to call contract at block {}", "latest"))
            .unwrap_err();

        match err {
            RPCError::RequestError(RequestError::Reqwest(e)) => {
                assert_eq!(e.msg, "Failed to call contract at block latest");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }
}
