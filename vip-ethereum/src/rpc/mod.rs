use std::time::Duration;

use alloy::{
    rpc::{
        client::{ClientBuilder, ReqwestClient},
        types::{BlockNumberOrTag, TransactionRequest},
    },
    transports::http::reqwest,
};
use tracing::{instrument, trace};

use crate::{errors::RPCError, rpc::errors::RpcResultExt};

pub mod config;
pub mod errors;
mod retry;

pub use retry::RetryPolicy;

use crate::rpc::config::RPCRetryConfig;

/// This struct wraps the ReqwestClient and provides the Ethereum RPC methods needed to read
/// view functions, with retry logic.
/// It is cheap to clone, as the `inner` internally uses an Arc for the ReqwestClient.
#[derive(Clone, Debug)]
pub struct EthereumRpcClient {
    inner: ReqwestClient,
    retry_policy: RetryPolicy,
    url: String,
}

impl EthereumRpcClient {
    /// Creates a new EthereumRpcClient with the given RPC URL.
    ///
    /// Retry: enabled with defaults (max retries 3, initial backoff 100ms, max backoff 5000ms).
    pub fn new(rpc_url: &str) -> Result<Self, RPCError> {
        let url = rpc_url
            .parse()
            .map_err(|e| RPCError::SetupError(format!("Invalid RPC URL: {}", e)))?;

        let http_client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RPCError::SetupError(format!("Failed to create HTTP client: {e}")))?;

        let rpc = ClientBuilder::default().http_with_client(http_client, url);

        let retry_policy = RPCRetryConfig::default().into();

        Ok(Self { inner: rpc, retry_policy, url: rpc_url.to_string() })
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    pub fn get_retry_config(&self) -> RPCRetryConfig {
        (&self.retry_policy).into()
    }

    pub fn with_retry(mut self, retry_config: RPCRetryConfig) -> Self {
        self.retry_policy = retry_config.into();
        self
    }

    /// Executes a new message call immediately without creating a transaction on the blockchain.
    /// See https://ethereum.org/en/developers/docs/apis/json-rpc/#eth_call
    ///
    /// Returns the output data of the call as the `0x` prefixed hex string sent by the node,
    /// without re-encoding it.
    #[instrument(level = "debug", skip(self, request))]
    pub async fn eth_call(
        &self,
        request: TransactionRequest,
        block: BlockNumberOrTag,
    ) -> Result<String, RPCError> {
        let output: String = self
            .retry_policy
            .retry_request(|| async {
                self.inner
                    .request("eth_call", (request.clone(), block))
                    .await
            })
            .await
            .with_rpc_context(|| format!("Failed to send an eth_call request for block {block}"))?;

        trace!(len = output.len(), "eth_call returned");
        Ok(output)
    }
}
