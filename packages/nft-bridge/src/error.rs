//! Typed bridge failures
//!
//! Everything else propagates as `eyre::Report`; these are the failures a
//! caller may want to match on (via `Report::downcast_ref`).

use alloy::primitives::Address;
use thiserror::Error;

use crate::chain::ChainBinding;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("NFT index response is missing '{field}': {body}")]
    MalformedIndexResponse { field: &'static str, body: String },

    #[error("no holders found for collection {0}")]
    NoHolders(Address),

    #[error("airdrop batch mixes ERC721 and ERC1155 units (holder {holder})")]
    MixedTokenStandards { holder: Address },

    #[error("cannot transfer ownership: operator {operator} is not the current owner {owner}")]
    NotCurrentOwner { owner: Address, operator: Address },

    #[error("another operation is already running for collection {0}")]
    OperationInProgress(Address),

    #[error("{capability} capability is bound to the {actual} chain, expected {expected}")]
    ChainBindingMismatch {
        capability: &'static str,
        expected: ChainBinding,
        actual: ChainBinding,
    },

    #[error("no royalty info for {collection}: standard call failed ({standard}), registry failed ({registry})")]
    RoyaltyUnavailable {
        collection: Address,
        standard: String,
        registry: String,
    },
}
