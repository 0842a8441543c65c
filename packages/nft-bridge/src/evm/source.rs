//! Source chain reads over JSON-RPC

use alloy::{
    primitives::{Address, FixedBytes, U256},
    providers::{ProviderBuilder, RootProvider},
    sol_types::SolCall,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use tracing::{debug, info};

use super::contracts::{IMulticall3, RoyaltyRegistry, IERC1155, IERC721};
use crate::chain::{ChainContext, SourceChain};
use crate::types::RoyaltyInfo;

/// Read-only client for the chain holding the original collections
pub struct EvmSourceChain {
    context: ChainContext,
    provider: RootProvider<Http<Client>>,
    royalty_registry: Address,
    multicall: Address,
}

impl EvmSourceChain {
    pub fn new(context: ChainContext, royalty_registry: Address, multicall: Address) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            context
                .rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        info!(
            rpc_url = %context.rpc_url,
            chain_id = context.chain_id,
            chain = %context.binding,
            "Created source chain client"
        );

        Ok(Self {
            context,
            provider,
            royalty_registry,
            multicall,
        })
    }

    fn encode_uri_call(is721: bool, token_id: U256) -> Vec<u8> {
        if is721 {
            IERC721::tokenURICall { tokenId: token_id }.abi_encode()
        } else {
            IERC1155::uriCall { id: token_id }.abi_encode()
        }
    }

    fn decode_uri_return(is721: bool, data: &[u8]) -> Option<String> {
        if is721 {
            IERC721::tokenURICall::abi_decode_returns(data, true)
                .ok()
                .map(|r| r._0)
        } else {
            IERC1155::uriCall::abi_decode_returns(data, true)
                .ok()
                .map(|r| r._0)
        }
    }
}

#[async_trait]
impl SourceChain for EvmSourceChain {
    fn context(&self) -> &ChainContext {
        &self.context
    }

    async fn name(&self, collection: Address) -> Result<String> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .name()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get name: {}", e))?;
        Ok(result._0)
    }

    async fn symbol(&self, collection: Address) -> Result<String> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .symbol()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get symbol: {}", e))?;
        Ok(result._0)
    }

    async fn token_uri(&self, collection: Address, token_id: U256) -> Result<String> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .tokenURI(token_id)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get tokenURI({}): {}", token_id, e))?;
        Ok(result._0)
    }

    async fn token_uris(
        &self,
        collection: Address,
        is721: bool,
        token_ids: &[U256],
    ) -> Result<Vec<Option<String>>> {
        if token_ids.is_empty() {
            return Ok(Vec::new());
        }

        let calls: Vec<IMulticall3::Call3> = token_ids
            .iter()
            .map(|id| IMulticall3::Call3 {
                target: collection,
                allowFailure: true,
                callData: Self::encode_uri_call(is721, *id).into(),
            })
            .collect();

        let multicall = IMulticall3::new(self.multicall, &self.provider);
        let result = multicall
            .aggregate3(calls)
            .call()
            .await
            .map_err(|e| eyre!("Failed to batch read token URIs: {}", e))?;

        let uris: Vec<Option<String>> = result
            .returnData
            .into_iter()
            .map(|r| {
                if r.success {
                    Self::decode_uri_return(is721, &r.returnData)
                } else {
                    None
                }
            })
            .collect();

        debug!(
            collection = %collection,
            requested = token_ids.len(),
            found = uris.iter().filter(|u| u.is_some()).count(),
            "Batch read token URIs"
        );

        Ok(uris)
    }

    async fn total_supply(&self, collection: Address) -> Result<U256> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .totalSupply()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get totalSupply: {}", e))?;
        Ok(result._0)
    }

    async fn token_by_index(&self, collection: Address, index: U256) -> Result<U256> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .tokenByIndex(index)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get tokenByIndex({}): {}", index, e))?;
        Ok(result._0)
    }

    async fn owner(&self, collection: Address) -> Result<Address> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .owner()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get owner: {}", e))?;
        Ok(result._0)
    }

    async fn royalty_info(
        &self,
        collection: Address,
        token_id: U256,
        sale_price: U256,
    ) -> Result<(Address, U256)> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .royaltyInfo(token_id, sale_price)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get royaltyInfo: {}", e))?;
        Ok((result.receiver, result.royaltyAmount))
    }

    async fn registry_royalty(&self, collection: Address) -> Result<RoyaltyInfo> {
        let registry = RoyaltyRegistry::new(self.royalty_registry, &self.provider);
        let result = registry
            .collectionRoyalties(collection)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get registry royalties: {}", e))?;
        Ok(RoyaltyInfo {
            recipient: result.recipient,
            fee: result.fee,
        })
    }

    async fn supports_interface(&self, collection: Address, interface_id: [u8; 4]) -> Result<bool> {
        let contract = IERC721::new(collection, &self.provider);
        let result = contract
            .supportsInterface(FixedBytes::from(interface_id))
            .call()
            .await
            .map_err(|e| eyre!("Failed to call supportsInterface: {}", e))?;
        Ok(result._0)
    }
}
