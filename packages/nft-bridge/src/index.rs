//! NFT index client
//!
//! The index is the only source of collection stats and holder listings.
//! `CollectionIndex` is the seam the orchestrator talks to; `PaintswapIndex`
//! is the HTTP implementation.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use crate::error::BridgeError;

/// Collection statistics used by the validation gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionStats {
    #[serde(default)]
    pub verified: bool,
    pub stats: CollectionCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionCounts {
    #[serde(rename = "totalNFTs", deserialize_with = "lenient_u64")]
    pub total_nfts: u64,
    #[serde(rename = "numOwners", deserialize_with = "lenient_u64")]
    pub num_owners: u64,
    /// Unix seconds of the last sale, if any
    #[serde(
        rename = "timestampLastSale",
        default,
        deserialize_with = "lenient_opt_u64"
    )]
    pub timestamp_last_sale: Option<u64>,
}

/// One (holder, token) record from a holder page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HolderRecord {
    pub user: Address,
    #[serde(rename = "tokenId", deserialize_with = "lenient_u256")]
    pub token_id: U256,
    #[serde(default = "one", deserialize_with = "lenient_u256")]
    pub amount: U256,
    #[serde(rename = "isERC721", default = "yes")]
    pub is_erc721: bool,
}

fn one() -> U256 {
    U256::from(1)
}

fn yes() -> bool {
    true
}

/// External NFT index
#[async_trait]
pub trait CollectionIndex: Send + Sync {
    /// Verification flag and size stats for a collection
    async fn collection_stats(&self, collection: Address) -> Result<CollectionStats>;

    /// One page of holder records ordered by token id
    async fn holder_page(
        &self,
        collection: Address,
        num_to_skip: u64,
        num_to_fetch: u64,
    ) -> Result<Vec<HolderRecord>>;
}

/// HTTP client for the PaintSwap-compatible index API
pub struct PaintswapIndex {
    base_url: Url,
    client: Client,
}

impl PaintswapIndex {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to create HTTP client")?;

        // Url::join drops the last segment unless the base ends in '/'
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).wrap_err_with(|| format!("Invalid index URL: {}", base_url))?;

        Ok(Self { base_url, client })
    }

    pub fn collection_url(&self, collection: Address) -> Result<Url> {
        self.base_url
            .join(&format!("v2/collections/{}", collection))
            .wrap_err("Failed to build collection URL")
    }

    pub fn holders_url(&self, collection: Address, num_to_skip: u64, num_to_fetch: u64) -> Result<Url> {
        let mut url = self
            .base_url
            .join("v2/userNFTs")
            .wrap_err("Failed to build holders URL")?;
        url.query_pairs_mut()
            .append_pair("requireUser", "false")
            .append_pair("collections", &collection.to_string())
            .append_pair("numToSkip", &num_to_skip.to_string())
            .append_pair("numToFetch", &num_to_fetch.to_string())
            .append_pair("orderBy", "tokenId");
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .wrap_err_with(|| format!("Failed to query NFT index: {}", url))?;

        if !response.status().is_success() {
            return Err(eyre!(
                "NFT index query failed: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            ));
        }

        response
            .json()
            .await
            .wrap_err("Failed to decode NFT index response")
    }
}

#[async_trait]
impl CollectionIndex for PaintswapIndex {
    async fn collection_stats(&self, collection: Address) -> Result<CollectionStats> {
        let url = self.collection_url(collection)?;
        debug!(collection = %collection, url = %url, "Fetching collection stats");

        let mut body = self.get_json(url).await?;

        // Stats are usually wrapped in a `collection` envelope
        let data = match body.get_mut("collection") {
            Some(inner) => inner.take(),
            None => body,
        };

        // Missing counts must not read as zero and slip through the size gates
        serde_json::from_value(data.clone()).map_err(|e| {
            debug!(collection = %collection, error = %e, "Collection stats incomplete");
            eyre::Report::from(BridgeError::MalformedIndexResponse {
                field: "stats",
                body: truncate(&data.to_string(), 256),
            })
        })
    }

    async fn holder_page(
        &self,
        collection: Address,
        num_to_skip: u64,
        num_to_fetch: u64,
    ) -> Result<Vec<HolderRecord>> {
        let url = self.holders_url(collection, num_to_skip, num_to_fetch)?;
        debug!(collection = %collection, num_to_skip, "Fetching holder page");

        let mut body = self.get_json(url).await?;

        let nfts = match body.get_mut("nfts") {
            Some(nfts) => nfts.take(),
            None => {
                return Err(BridgeError::MalformedIndexResponse {
                    field: "nfts",
                    body: truncate(&body.to_string(), 256),
                }
                .into())
            }
        };

        serde_json::from_value(nfts).wrap_err("Failed to parse holder records")
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

// ============================================================================
// Lenient numeric fields
// ============================================================================

/// The index returns counts and ids either as JSON numbers or decimal strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(u64),
    Str(String),
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_opt_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumOrString::Num(n)) => Ok(Some(n)),
        Some(NumOrString::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(NumOrString::Str(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn lenient_u256<'de, D>(deserializer: D) -> std::result::Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(U256::from(n)),
        NumOrString::Str(s) => U256::from_str_radix(s.trim(), 10).map_err(serde::de::Error::custom),
    }
}
