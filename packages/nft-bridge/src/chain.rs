//! Chain capabilities
//!
//! Every chain call goes through a `SourceChain` (reads of the original
//! collection) or a `TargetChain` (bridge control and bridged tokens). Each
//! implementation carries the `ChainContext` it is bound to, so a call can
//! never silently land on the wrong network.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;
use std::fmt;

use crate::types::{AirdropUnit, RoyaltyInfo, TxHandle};

/// Which side of the bridge a capability talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainBinding {
    /// Chain holding the original collection
    Source,
    /// Chain holding the bridge control and bridged collections
    Target,
}

impl fmt::Display for ChainBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainBinding::Source => write!(f, "source"),
            ChainBinding::Target => write!(f, "target"),
        }
    }
}

/// Network a capability is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    pub binding: ChainBinding,
    pub chain_id: u64,
    pub rpc_url: String,
}

impl ChainContext {
    pub fn source(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            binding: ChainBinding::Source,
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn target(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            binding: ChainBinding::Target,
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }
}

/// Arguments of `deployERC721`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc721Deployment {
    pub original: Address,
    pub owner: Address,
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    pub extension: String,
    pub royalty: RoyaltyInfo,
    pub enumerable: bool,
}

/// Arguments of `deployERC1155`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc1155Deployment {
    pub original: Address,
    pub owner: Address,
    pub royalty: RoyaltyInfo,
    pub name: String,
}

/// Read access to original collections
#[async_trait]
pub trait SourceChain: Send + Sync {
    fn context(&self) -> &ChainContext;

    async fn name(&self, collection: Address) -> Result<String>;

    async fn symbol(&self, collection: Address) -> Result<String>;

    /// ERC-721 `tokenURI`
    async fn token_uri(&self, collection: Address, token_id: U256) -> Result<String>;

    /// `tokenURI` (ERC-721) or `uri` (ERC-1155) for many ids in one round
    /// trip. A failed individual read is `None`.
    async fn token_uris(
        &self,
        collection: Address,
        is721: bool,
        token_ids: &[U256],
    ) -> Result<Vec<Option<String>>>;

    async fn total_supply(&self, collection: Address) -> Result<U256>;

    async fn token_by_index(&self, collection: Address, index: U256) -> Result<U256>;

    async fn owner(&self, collection: Address) -> Result<Address>;

    /// ERC-2981 `royaltyInfo`, returns (receiver, royalty amount)
    async fn royalty_info(
        &self,
        collection: Address,
        token_id: U256,
        sale_price: U256,
    ) -> Result<(Address, U256)>;

    /// Royalty registry entry for the collection
    async fn registry_royalty(&self, collection: Address) -> Result<RoyaltyInfo>;

    async fn supports_interface(&self, collection: Address, interface_id: [u8; 4]) -> Result<bool>;
}

/// Bridge control and bridged token access
#[async_trait]
pub trait TargetChain: Send + Sync {
    fn context(&self) -> &ChainContext;

    /// Account that signs every write
    fn operator_address(&self) -> Address;

    /// Zero address when not bridged
    async fn bridged_address_for_original(&self, original: Address) -> Result<Address>;

    /// Zero address when `bridged` is not a bridged collection
    async fn original_address_for_bridged(&self, bridged: Address) -> Result<Address>;

    async fn bridging_approved(&self, original: Address) -> Result<bool>;

    async fn set_bridging_approved(&self, collection: Address, approved: bool) -> Result<TxHandle>;

    async fn deploy_erc721(&self, deployment: &Erc721Deployment) -> Result<TxHandle>;

    async fn deploy_erc1155(&self, deployment: &Erc1155Deployment) -> Result<TxHandle>;

    async fn airdrop721(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle>;

    async fn airdrop1155(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle>;

    /// `batchSetTokenURIs` through the bridge control
    async fn batch_set_token_uris(
        &self,
        bridged: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle>;

    async fn clear_bridged_storage(&self, original: Address) -> Result<TxHandle>;

    /// `batchSetTokenURIs` on the token contract itself
    async fn token_batch_set_token_uris(
        &self,
        token: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle>;

    /// `setTokenURI` on the token contract itself
    async fn token_set_token_uri(&self, token: Address, token_id: U256, uri: &str) -> Result<TxHandle>;

    async fn token_owner(&self, token: Address) -> Result<Address>;

    async fn token_transfer_ownership(&self, token: Address, new_owner: Address) -> Result<TxHandle>;
}
