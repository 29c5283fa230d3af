use std::{error::Error, fmt::Display};

use thiserror::Error;

use crate::rpc::errors::AlloyError;

#[derive(Error, Debug)]
pub struct ReqwestError {
    pub msg: String,
    #[source]
    pub source: AlloyError,
}

impl Display for ReqwestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.msg, self.source)
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    Reqwest(ReqwestError),
    Other(String),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Reqwest(e) => write!(f, "{}: {}", e.msg, e.source),
            RequestError::Other(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RPCError {
    #[error("RPC setup error: {0}")]
    SetupError(String),
    #[error("Request error: {0}")]
    RequestError(RequestError),
    /// The node executed the call and the contract reverted. Usually caused by a wrong
    /// contract address, a contract without the called function or invalid arguments.
    #[error("Contract call reverted: {0}")]
    Reverted(String),
}

/// Helper function to extract the full error chain including source errors
pub fn extract_error_chain(error: &dyn Error) -> String {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();

    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }

    if chain.len() == 1 {
        chain[0].clone()
    } else {
        format!("{} (caused by: {})", chain[0], chain[1..].join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use alloy::transports::{HttpError, RpcError, TransportErrorKind};

    use super::*;

    #[test]
    fn test_extract_error_chain_single() {
        let err = RPCError::SetupError("Invalid RPC URL".to_string());

        assert_eq!(extract_error_chain(&err), "RPC setup error: Invalid RPC URL");
    }

    #[test]
    fn test_extract_error_chain_nested() {
        let source = RpcError::<TransportErrorKind>::Transport(TransportErrorKind::HttpError(
            HttpError { status: 502, body: "bad gateway".to_string() },
        ));
        let err = ReqwestError { msg: "Failed to call contract".to_string(), source };

        let chain = extract_error_chain(&err);

        assert!(chain.starts_with("Failed to call contract: "), "unexpected chain: {chain}");
        assert!(chain.contains("(caused by: "), "unexpected chain: {chain}");
    }
}
