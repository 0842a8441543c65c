//! Bridge orchestration
//!
//! `NftBridge` drives a collection through
//! `UNBRIDGED -> VALIDATED -> DEPLOYED -> AIRDROPPED -> URIS_SET -> COMPLETE`,
//! stopping at a gate (`Outcome`) when the collection is already bridged, not
//! approved, fails validation or the deploy does not register.
//!
//! The bridge control registry is queried on every operation and never
//! cached. Flows that write hold the per-collection lock for the original
//! address from the moment it is resolved.
//!
//! ## Submodules
//!
//! - `outcome` - flow results and reports
//! - `locks` - per-collection in-process locks
//! - `airdrop` - chunked ownership replay
//! - `bridge` - bridge and remint
//! - `maintenance` - reclaim, rebridge, approve, clear, set URIs, ownership transfer

pub mod airdrop;
pub mod bridge;
pub mod locks;
pub mod maintenance;
pub mod outcome;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::Utc;
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::chain::{ChainBinding, Erc1155Deployment, Erc721Deployment, SourceChain, TargetChain};
use crate::config::{Config, DEFAULT_AIRDROP_TOKEN_BUDGET, DEFAULT_RECLAIM_TOKEN_BUDGET};
use crate::error::BridgeError;
use crate::index::CollectionIndex;
use crate::inspector::{get_collection_data, get_collection_name, is_enumerable};
use crate::replicator::{get_token_uris, set_token_uris};
use crate::types::{CollectionData, RoyaltyInfo, TokenStandard, TxHandle};
use crate::validation::{ValidationFailure, ValidationPolicy};

pub use locks::{CollectionGuard, CollectionLocks};
pub use maintenance::SetUrisMode;
pub use outcome::{
    BridgeReport, ClearReport, Outcome, RebridgeReport, ReclaimReport, RemintReport, Resolution,
    UriReport,
};

/// Limits shared by every flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub policy: ValidationPolicy,
    /// Max token ids per airdrop transaction
    pub airdrop_token_budget: usize,
    /// Max token ids per ERC-721 reclaim transaction
    pub reclaim_token_budget: usize,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            airdrop_token_budget: DEFAULT_AIRDROP_TOKEN_BUDGET,
            reclaim_token_budget: DEFAULT_RECLAIM_TOKEN_BUDGET,
        }
    }
}

impl BridgeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.validation_policy(),
            airdrop_token_budget: config.airdrop_token_budget,
            reclaim_token_budget: config.reclaim_token_budget,
        }
    }
}

/// Per-request switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Skip the validation gate
    pub override_requirements: bool,
    /// Owner for the bridged contract instead of the original's `owner()`
    pub owner_override: Option<Address>,
}

/// Progress of a multi-step flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
    pub message: String,
}

/// Bridges collections from the source chain to the target chain
pub struct NftBridge {
    source: Arc<dyn SourceChain>,
    target: Arc<dyn TargetChain>,
    index: Arc<dyn CollectionIndex>,
    settings: BridgeSettings,
    locks: CollectionLocks,
    progress: Option<mpsc::UnboundedSender<Progress>>,
}

impl NftBridge {
    /// Fails with `ChainBindingMismatch` unless `source` is bound to the
    /// source chain and `target` to the target chain
    pub fn new(
        source: Arc<dyn SourceChain>,
        target: Arc<dyn TargetChain>,
        index: Arc<dyn CollectionIndex>,
        settings: BridgeSettings,
    ) -> Result<Self> {
        let actual = source.context().binding;
        if actual != ChainBinding::Source {
            return Err(BridgeError::ChainBindingMismatch {
                capability: "source",
                expected: ChainBinding::Source,
                actual,
            }
            .into());
        }

        let actual = target.context().binding;
        if actual != ChainBinding::Target {
            return Err(BridgeError::ChainBindingMismatch {
                capability: "target",
                expected: ChainBinding::Target,
                actual,
            }
            .into());
        }

        info!(
            source_chain_id = source.context().chain_id,
            target_chain_id = target.context().chain_id,
            operator = %target.operator_address(),
            "NFT bridge initialized"
        );

        Ok(Self {
            source,
            target,
            index,
            settings,
            locks: CollectionLocks::new(),
            progress: None,
        })
    }

    /// Send step progress of long flows to `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<Progress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Share a lock table with other bridge instances in this process
    pub fn with_locks(mut self, locks: CollectionLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn locks(&self) -> &CollectionLocks {
        &self.locks
    }

    fn report_progress(&self, step: usize, total: usize, message: String) {
        info!(step, total, "{}", message);
        if let Some(tx) = &self.progress {
            // Receiver may have gone away; the flow continues regardless
            let _ = tx.send(Progress {
                step,
                total,
                message,
            });
        }
    }

    // ========================================================================
    // Registry resolution
    // ========================================================================

    /// Original address for `address` and whether `address` was the bridged side
    async fn original_of(&self, address: Address) -> Result<(Address, bool)> {
        let original = self.target.original_address_for_bridged(address).await?;
        if original.is_zero() {
            Ok((address, false))
        } else {
            Ok((original, true))
        }
    }

    async fn bridged_of(&self, original: Address) -> Result<Option<Address>> {
        let bridged = self.target.bridged_address_for_original(original).await?;
        Ok((!bridged.is_zero()).then_some(bridged))
    }

    /// Resolve `address` without taking a lock
    pub async fn resolve(&self, address: Address) -> Result<Option<Resolution>> {
        let (original, input_is_bridged) = self.original_of(address).await?;
        let bridged = if input_is_bridged {
            Some(address)
        } else {
            self.bridged_of(original).await?
        };

        if !input_is_bridged && bridged.is_none() {
            return Ok(None);
        }

        Ok(Some(Resolution {
            original_address: original,
            bridged_address: bridged,
            input_is_bridged,
        }))
    }

    /// Original collection for either side of a bridged pair
    pub async fn resolve_original_address(&self, address: Address) -> Result<Option<Address>> {
        Ok(self.resolve(address).await?.map(|r| r.original_address))
    }

    /// Lock the original collection and find its bridged counterpart
    async fn lock_bridged(
        &self,
        address: Address,
    ) -> Result<(CollectionGuard, Address, Option<Address>)> {
        let (original, _) = self.original_of(address).await?;
        let guard = self.locks.acquire(original)?;
        let bridged = self.bridged_of(original).await?;
        Ok((guard, original, bridged))
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    /// Run the validation gate unless overridden
    async fn check_requirements(
        &self,
        original: Address,
        options: &BridgeOptions,
    ) -> Result<Option<ValidationFailure>> {
        if options.override_requirements {
            info!(collection = %original, "Validation overridden");
            return Ok(None);
        }

        let stats = self.index.collection_stats(original).await?;
        match self.settings.policy.validate(&stats, Utc::now()) {
            Ok(()) => {
                info!(collection = %original, "Collection passed all validation checks");
                Ok(None)
            }
            Err(failure) => {
                warn!(
                    collection = %original,
                    metric = failure.metric(),
                    reason = %failure,
                    "Collection validation failed"
                );
                Ok(Some(failure))
            }
        }
    }

    /// Deploy the bridged contract; ERC-721 returns the collection data it used
    async fn deploy(
        &self,
        original: Address,
        standard: TokenStandard,
        owner: Address,
        royalty: &RoyaltyInfo,
    ) -> Result<(TxHandle, Option<CollectionData>)> {
        match standard {
            TokenStandard::Erc721 => {
                let data = get_collection_data(self.source.as_ref(), original).await?;
                let enumerable = is_enumerable(self.source.as_ref(), original).await;

                info!(
                    collection = %original,
                    name = %data.name,
                    base_uri = %data.base_uri,
                    enumerable,
                    "Deploying ERC721"
                );

                let tx = self
                    .target
                    .deploy_erc721(&Erc721Deployment {
                        original,
                        owner,
                        name: data.name.clone(),
                        symbol: data.symbol.clone(),
                        base_uri: data.base_uri.clone(),
                        extension: data.extension.clone(),
                        royalty: royalty.clone(),
                        enumerable,
                    })
                    .await?;
                Ok((tx, Some(data)))
            }
            TokenStandard::Erc1155 => {
                let name = get_collection_name(self.source.as_ref(), original).await;

                info!(collection = %original, name = %name, "Deploying ERC1155");

                let tx = self
                    .target
                    .deploy_erc1155(&Erc1155Deployment {
                        original,
                        owner,
                        royalty: royalty.clone(),
                        name,
                    })
                    .await?;
                Ok((tx, None))
            }
        }
    }

    /// Replay URIs unless an ERC-721 base URI already covers them
    async fn backfill_uris(
        &self,
        original: Address,
        bridged: Address,
        standard: TokenStandard,
        data: Option<&CollectionData>,
    ) -> Result<Option<Vec<TxHandle>>> {
        if standard.is_721() && data.is_some_and(CollectionData::has_uri_template) {
            return Ok(None);
        }

        let uris = get_token_uris(self.source.as_ref(), original, standard.is_721()).await?;
        let txs = set_token_uris(self.target.as_ref(), bridged, &uris, None).await?;
        info!(
            collection = %original,
            bridged = %bridged,
            txs = txs.len(),
            "Token URIs replayed"
        );
        Ok(Some(txs))
    }
}
