//! Collection inspection on the source chain
//!
//! Metadata, royalty and ownership reads used to configure the bridged
//! contract. Owner, enumerability, name and supply lookups degrade to a
//! default instead of failing the operation.

use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{debug, warn};

use crate::chain::SourceChain;
use crate::error::BridgeError;
use crate::types::{CollectionData, RoyaltyInfo, ERC1155_INTERFACE_ID};
use crate::uri::parse_uri_template;

/// Sale price used to probe `royaltyInfo` (1 ether)
const ROYALTY_PROBE_PRICE: u128 = 1_000_000_000_000_000_000;

/// Royalty amount per basis point at the probe price
const ROYALTY_AMOUNT_PER_BPS: u128 = 100_000_000_000_000;

/// Name, symbol and URI template of a collection, decided from token 1
pub async fn get_collection_data(source: &dyn SourceChain, collection: Address) -> Result<CollectionData> {
    let name = source.name(collection).await?;
    let symbol = source.symbol(collection).await?;

    let template = match source.token_uri(collection, U256::from(1)).await {
        Ok(uri) => parse_uri_template(&uri),
        Err(e) => {
            debug!(collection = %collection, error = %e, "No tokenURI(1), URIs will be replayed");
            None
        }
    };

    let data = match template {
        Some(t) => CollectionData {
            name,
            symbol,
            has_extension: t.has_extension(),
            base_uri: t.base,
            extension: t.extension,
        },
        None => CollectionData {
            name,
            symbol,
            ..CollectionData::default()
        },
    };

    Ok(data)
}

/// Whether `totalSupply()` answers
pub async fn is_enumerable(source: &dyn SourceChain, collection: Address) -> bool {
    match source.total_supply(collection).await {
        Ok(_) => true,
        Err(e) => {
            debug!(collection = %collection, error = %e, "Collection is not enumerable");
            false
        }
    }
}

/// ERC-2981 royalty, with the fee converted to basis points
pub async fn get_nft_royalty_info(source: &dyn SourceChain, collection: Address) -> Result<RoyaltyInfo> {
    let (recipient, amount) = source
        .royalty_info(collection, U256::from(1), U256::from(ROYALTY_PROBE_PRICE))
        .await?;

    Ok(RoyaltyInfo {
        recipient,
        fee: amount / U256::from(ROYALTY_AMOUNT_PER_BPS),
    })
}

/// Royalty registry entry
pub async fn get_onchain_royalty_info(source: &dyn SourceChain, collection: Address) -> Result<RoyaltyInfo> {
    source.registry_royalty(collection).await
}

/// Standard royalty first, then the registry; fails only when both do
pub async fn resolve_royalty(source: &dyn SourceChain, collection: Address) -> Result<RoyaltyInfo> {
    let standard_err = match get_nft_royalty_info(source, collection).await {
        Ok(royalty) => return Ok(royalty),
        Err(e) => e,
    };

    warn!(
        collection = %collection,
        error = %standard_err,
        "royaltyInfo unavailable, falling back to registry"
    );

    match get_onchain_royalty_info(source, collection).await {
        Ok(royalty) => Ok(royalty),
        Err(registry_err) => Err(BridgeError::RoyaltyUnavailable {
            collection,
            standard: standard_err.to_string(),
            registry: registry_err.to_string(),
        }
        .into()),
    }
}

/// `owner()`, or the zero address when the collection has none
pub async fn get_collection_owner(source: &dyn SourceChain, collection: Address) -> Address {
    match source.owner(collection).await {
        Ok(owner) => owner,
        Err(e) => {
            warn!(collection = %collection, error = %e, "Failed to get collection owner");
            Address::ZERO
        }
    }
}

/// `name()`, or an empty string
pub async fn get_collection_name(source: &dyn SourceChain, collection: Address) -> String {
    source.name(collection).await.unwrap_or_default()
}

/// ERC-165 probe for ERC-1155; failures count as "no"
pub async fn is_erc1155(source: &dyn SourceChain, collection: Address) -> bool {
    source
        .supports_interface(collection, ERC1155_INTERFACE_ID)
        .await
        .unwrap_or(false)
}

/// `totalSupply()`, or zero
pub async fn get_total_supply(source: &dyn SourceChain, collection: Address) -> U256 {
    source.total_supply(collection).await.unwrap_or(U256::ZERO)
}
