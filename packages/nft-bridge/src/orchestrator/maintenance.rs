//! Operator flows on collections that are already bridged

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{error, info};

use super::airdrop::{admin_units_1155, admin_units_721, airdrop_holders};
use super::outcome::{ClearReport, Outcome, RebridgeReport, ReclaimReport, UriReport};
use super::{BridgeOptions, NftBridge};
use crate::error::BridgeError;
use crate::holders::{get_holders, HolderBook};
use crate::inspector::{get_collection_owner, is_erc1155, resolve_royalty};
use crate::replicator::{
    get_token_uris, get_token_uris_via_enumerable, set_token_uris, set_token_uris_direct,
    set_token_uris_from_pairs,
};
use crate::types::{TokenStandard, TxHandle};

const REBRIDGE_STEPS: usize = 4;

/// Where the set-URIs flow writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetUrisMode {
    /// Through the bridge control's `batchSetTokenURIs`
    #[default]
    Bridge,
    /// Straight to the bridged token contract
    Direct,
    /// Read by index on the source, one bridge call per token
    Enumerable,
}

impl SetUrisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetUrisMode::Bridge => "bridge",
            SetUrisMode::Direct => "direct",
            SetUrisMode::Enumerable => "enumerable",
        }
    }
}

impl fmt::Display for SetUrisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetUrisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bridge" => Ok(SetUrisMode::Bridge),
            "direct" => Ok(SetUrisMode::Direct),
            "enumerable" => Ok(SetUrisMode::Enumerable),
            other => Err(format!(
                "Unknown set-URIs mode: {} (expected bridge, direct or enumerable)",
                other
            )),
        }
    }
}

impl NftBridge {
    /// Mint every bridged token to the operator so the collection can be
    /// redeployed or retired
    pub async fn reclaim(
        &self,
        address: Address,
        options: &BridgeOptions,
    ) -> Result<Outcome<ReclaimReport>> {
        let (_guard, original, bridged) = self.lock_bridged(address).await?;
        let Some(bridged) = bridged else {
            return Ok(Outcome::NotBridged {
                original_address: original,
            });
        };

        if let Some(failure) = self.check_requirements(original, options).await? {
            return Ok(Outcome::ValidationFailed {
                original_address: original,
                failure,
            });
        }

        let holders = get_holders(self.index.as_ref(), original).await?;
        let report = self.reclaim_to_admin(original, bridged, &holders).await?;
        Ok(Outcome::Complete(report))
    }

    async fn reclaim_to_admin(
        &self,
        original: Address,
        bridged: Address,
        holders: &HolderBook,
    ) -> Result<ReclaimReport> {
        let admin = self.target.operator_address();
        let standard = holders.standard();

        let airdrop_txs = match standard {
            None => {
                info!(collection = %original, "No holders to reclaim");
                Vec::new()
            }
            Some(TokenStandard::Erc721) => {
                let budget = self.settings.reclaim_token_budget;
                let units = admin_units_721(admin, holders.units(), budget);
                airdrop_holders(self.target.as_ref(), bridged, &units, budget).await?
            }
            Some(TokenStandard::Erc1155) => {
                // Per-holder units keep their shape, so the regular airdrop limit applies
                let units = admin_units_1155(admin, holders.units());
                airdrop_holders(
                    self.target.as_ref(),
                    bridged,
                    &units,
                    self.settings.airdrop_token_budget,
                )
                .await?
            }
        };

        info!(
            collection = %original,
            bridged = %bridged,
            admin = %admin,
            txs = airdrop_txs.len(),
            "Reclaim complete"
        );

        Ok(ReclaimReport {
            original_address: original,
            bridged_address: bridged,
            admin,
            standard,
            airdrop_txs,
        })
    }

    /// Reclaim, clear the registry entry, redeploy and airdrop to current holders
    pub async fn rebridge(
        &self,
        address: Address,
        options: &BridgeOptions,
    ) -> Result<Outcome<RebridgeReport>> {
        let (_guard, original, previous) = self.lock_bridged(address).await?;
        let Some(previous) = previous else {
            return Ok(Outcome::NotBridged {
                original_address: original,
            });
        };

        if let Some(failure) = self.check_requirements(original, options).await? {
            return Ok(Outcome::ValidationFailed {
                original_address: original,
                failure,
            });
        }

        self.report_progress(1, REBRIDGE_STEPS, format!("Reclaiming NFTs from {}", previous));
        let holders = get_holders(self.index.as_ref(), original).await?;
        let reclaim = self.reclaim_to_admin(original, previous, &holders).await?;

        self.report_progress(2, REBRIDGE_STEPS, format!("Clearing bridged storage for {}", original));
        let clear_tx = self.target.clear_bridged_storage(original).await?;

        self.report_progress(3, REBRIDGE_STEPS, format!("Redeploying {}", original));
        let standard = match holders.standard() {
            Some(standard) => standard,
            None => TokenStandard::from_is721(!is_erc1155(self.source.as_ref(), original).await),
        };
        let royalty = resolve_royalty(self.source.as_ref(), original).await?;
        let owner = match options.owner_override {
            Some(owner) => owner,
            None => get_collection_owner(self.source.as_ref(), original).await,
        };
        let (deployment_tx, data) = self.deploy(original, standard, owner, &royalty).await?;

        let Some(bridged) = self.bridged_of(original).await? else {
            error!(
                collection = %original,
                tx_hash = %deployment_tx,
                "Redeployment did not register a bridged collection"
            );
            return Ok(Outcome::DeployFailed {
                original_address: original,
                deployment_tx,
            });
        };

        self.report_progress(4, REBRIDGE_STEPS, format!("Airdropping NFTs to holders of {}", bridged));
        let holders = get_holders(self.index.as_ref(), original).await?;
        let airdrop_txs = airdrop_holders(
            self.target.as_ref(),
            bridged,
            holders.units(),
            self.settings.airdrop_token_budget,
        )
        .await?;
        let uri_txs = self
            .backfill_uris(original, bridged, standard, data.as_ref())
            .await?;

        info!(
            collection = %original,
            previous = %previous,
            bridged = %bridged,
            "Rebridge complete"
        );

        Ok(Outcome::Complete(RebridgeReport {
            original_address: original,
            previous_bridged_address: previous,
            bridged_address: bridged,
            standard,
            owner,
            royalty,
            holders: holders.len(),
            reclaim_txs: reclaim.airdrop_txs,
            clear_tx,
            deployment_tx,
            airdrop_txs,
            uri_txs,
        }))
    }

    /// Set whether `collection` may be bridged
    pub async fn approve(&self, collection: Address, approved: bool) -> Result<TxHandle> {
        let tx = self
            .target
            .set_bridging_approved(collection, approved)
            .await?;
        info!(collection = %collection, approved, tx_hash = %tx, "Bridging approval updated");
        Ok(tx)
    }

    /// Remove the registry entry for a bridged collection
    pub async fn clear(&self, address: Address) -> Result<Outcome<ClearReport>> {
        let (_guard, original, bridged) = self.lock_bridged(address).await?;
        let Some(bridged) = bridged else {
            return Ok(Outcome::NotBridged {
                original_address: original,
            });
        };

        let clear_tx = self.target.clear_bridged_storage(original).await?;
        info!(collection = %original, bridged = %bridged, tx_hash = %clear_tx, "Bridged storage cleared");

        Ok(Outcome::Complete(ClearReport {
            original_address: original,
            bridged_address: bridged,
            clear_tx,
        }))
    }

    /// Replay source token URIs from `start_index` onwards
    pub async fn set_uris(
        &self,
        address: Address,
        start_index: u64,
        mode: SetUrisMode,
    ) -> Result<Outcome<UriReport>> {
        let (_guard, original, bridged) = self.lock_bridged(address).await?;
        let Some(bridged) = bridged else {
            return Ok(Outcome::NotBridged {
                original_address: original,
            });
        };

        let is721 = !is_erc1155(self.source.as_ref(), original).await;
        info!(
            collection = %original,
            bridged = %bridged,
            start_index,
            mode = %mode,
            is721,
            "Setting token URIs"
        );

        let uri_txs = match mode {
            SetUrisMode::Bridge | SetUrisMode::Direct => {
                let uris = get_token_uris(self.source.as_ref(), original, is721).await?;
                let start = usize::try_from(start_index).unwrap_or(usize::MAX).min(uris.len());
                let tail = &uris[start..];
                if mode == SetUrisMode::Bridge {
                    set_token_uris(self.target.as_ref(), bridged, tail, Some(start_index)).await?
                } else {
                    set_token_uris_direct(self.target.as_ref(), bridged, tail, start_index).await?
                }
            }
            SetUrisMode::Enumerable => {
                let pairs: Vec<_> = get_token_uris_via_enumerable(self.source.as_ref(), original)
                    .await?
                    .into_iter()
                    .filter(|(token_id, _)| *token_id >= U256::from(start_index))
                    .collect();
                set_token_uris_from_pairs(self.target.as_ref(), bridged, &pairs).await?
            }
        };

        Ok(Outcome::Complete(UriReport {
            original_address: original,
            bridged_address: bridged,
            mode: mode.as_str(),
            start_index,
            uri_txs,
        }))
    }

    /// Hand ownership of a bridged token contract to `new_owner`
    pub async fn transfer_ownership(&self, token: Address, new_owner: Address) -> Result<TxHandle> {
        let operator = self.target.operator_address();
        let owner = self.target.token_owner(token).await?;
        if owner != operator {
            return Err(BridgeError::NotCurrentOwner { owner, operator }.into());
        }

        let tx = self
            .target
            .token_transfer_ownership(token, new_owner)
            .await?;
        info!(token = %token, new_owner = %new_owner, tx_hash = %tx, "Ownership transferred");
        Ok(tx)
    }
}
