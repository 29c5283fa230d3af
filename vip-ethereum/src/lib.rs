#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod abi;
pub mod collector;
pub mod errors;
pub mod rpc;
pub mod score_contract;

#[cfg(test)]
pub mod test_fixtures;

pub use abi::{
    score_response::{decode_score_response, is_plausible_entry},
    DecodeError,
};
pub use collector::{CollectorConfig, CollectorError, PaginatedCollector};
pub use errors::RPCError;
pub use rpc::EthereumRpcClient;
pub use score_contract::EvmScoreContract;
