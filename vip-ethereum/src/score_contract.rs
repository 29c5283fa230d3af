use std::str::FromStr;

use alloy::{
    primitives::{Address, Bytes, U256},
    rpc::types::{BlockNumberOrTag, TransactionInput, TransactionRequest},
};
use async_trait::async_trait;
use tracing::{debug, instrument};
use vip_common::{models::StageId, traits::ScoreSource};

use crate::{abi::WORD_SIZE, errors::RPCError, rpc::EthereumRpcClient};

/// Selector the deployed score contracts dispatch `getScores(stage, offset, limit)` on.
///
/// This is not the keccak selector of `getScores(uint256,uint256,uint256)` (`0x10564425`), so
/// the call cannot be generated with `sol!`. It is the value the deployed contracts accept.
pub const GET_SCORES_SELECTOR: [u8; 4] = [0x99, 0x03, 0x57, 0xe5];

/// Encodes a `getScores(stage, offset, limit)` call: the selector followed by each argument as
/// a big-endian word, zero padded to 32 bytes.
pub fn encode_get_scores(stage: StageId, offset: u64, limit: u64) -> Bytes {
    let mut calldata = Vec::with_capacity(GET_SCORES_SELECTOR.len() + 3 * WORD_SIZE);
    calldata.extend_from_slice(&GET_SCORES_SELECTOR);
    for arg in [stage, offset, limit] {
        calldata.extend_from_slice(&U256::from(arg).to_be_bytes::<WORD_SIZE>());
    }
    Bytes::from(calldata)
}

/// A VIP score contract deployed on an EVM chain, read through `eth_call`.
#[derive(Clone, Debug)]
pub struct EvmScoreContract {
    client: EthereumRpcClient,
    address: Address,
    block: BlockNumberOrTag,
}

impl EvmScoreContract {
    /// Reads the contract at `address` at the latest block.
    pub fn new(client: EthereumRpcClient, address: Address) -> Self {
        Self { client, address, block: BlockNumberOrTag::Latest }
    }

    /// Parses the contract address from a hex string, with or without a checksum.
    pub fn from_str_address(client: EthereumRpcClient, address: &str) -> Result<Self, RPCError> {
        let address = Address::from_str(address)
            .map_err(|e| RPCError::SetupError(format!("Invalid contract address {address}: {e}")))?;
        Ok(Self::new(client, address))
    }

    /// Pins all reads to `block` instead of the latest block.
    pub fn at_block(mut self, block: BlockNumberOrTag) -> Self {
        self.block = block;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl ScoreSource for EvmScoreContract {
    type Error = RPCError;

    #[instrument(level = "debug", skip(self), fields(contract = %self.address))]
    async fn fetch_page(
        &self,
        stage: StageId,
        offset: u64,
        limit: u64,
    ) -> Result<String, Self::Error> {
        let calldata = encode_get_scores(stage, offset, limit);
        debug!(%calldata, "Calling getScores");

        let request = TransactionRequest::default()
            .to(self.address)
            .input(TransactionInput::new(calldata));

        self.client
            .eth_call(request, self.block)
            .await
    }
}
