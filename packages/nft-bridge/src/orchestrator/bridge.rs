//! Bridge and remint flows

use alloy::primitives::Address;
use eyre::Result;
use tracing::{error, info};

use super::airdrop::airdrop_holders;
use super::outcome::{BridgeReport, Outcome, RemintReport};
use super::{BridgeOptions, NftBridge};
use crate::error::BridgeError;
use crate::holders::get_holders;
use crate::inspector::{get_collection_data, get_collection_owner, resolve_royalty};

impl NftBridge {
    /// Bridge a collection: validate, deploy its counterpart on the target
    /// chain, replay ownership and, where no base URI covers them, token URIs.
    ///
    /// `address` may be either side of a pair; a bridged address always
    /// stops at `AlreadyBridged`.
    pub async fn bridge(
        &self,
        address: Address,
        options: &BridgeOptions,
    ) -> Result<Outcome<BridgeReport>> {
        let (original, input_is_bridged) = self.original_of(address).await?;
        let _guard = self.locks.acquire(original)?;

        info!(
            collection = %original,
            input = %address,
            override_requirements = options.override_requirements,
            "Starting bridge"
        );

        let existing = if input_is_bridged {
            Some(address)
        } else {
            self.bridged_of(original).await?
        };
        if let Some(bridged_address) = existing {
            info!(collection = %original, bridged = %bridged_address, "Collection already bridged");
            return Ok(Outcome::AlreadyBridged {
                original_address: original,
                bridged_address,
            });
        }

        if !self.target.bridging_approved(original).await? {
            info!(collection = %original, "Collection not approved for bridging");
            return Ok(Outcome::NotApproved {
                original_address: original,
            });
        }

        if let Some(failure) = self.check_requirements(original, options).await? {
            return Ok(Outcome::ValidationFailed {
                original_address: original,
                failure,
            });
        }

        let holders = get_holders(self.index.as_ref(), original).await?;
        let Some(standard) = holders.standard() else {
            return Err(BridgeError::NoHolders(original).into());
        };

        let royalty = resolve_royalty(self.source.as_ref(), original).await?;
        let owner = match options.owner_override {
            Some(owner) => owner,
            None => get_collection_owner(self.source.as_ref(), original).await,
        };

        let (deployment_tx, data) = self.deploy(original, standard, owner, &royalty).await?;
        info!(collection = %original, tx_hash = %deployment_tx, "Deployment submitted");

        let Some(bridged) = self.bridged_of(original).await? else {
            error!(
                collection = %original,
                tx_hash = %deployment_tx,
                "Deployment did not register a bridged collection"
            );
            return Ok(Outcome::DeployFailed {
                original_address: original,
                deployment_tx,
            });
        };

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
            bridged = %bridged,
            standard = %standard,
            holders = holders.len(),
            "Bridge complete"
        );

        Ok(Outcome::Complete(BridgeReport {
            original_address: original,
            bridged_address: bridged,
            standard,
            owner,
            royalty,
            holders: holders.len(),
            deployment_tx,
            airdrop_txs,
            uri_txs,
        }))
    }

    /// Replay current holders onto an existing bridged collection
    pub async fn remint(
        &self,
        address: Address,
        options: &BridgeOptions,
    ) -> Result<Outcome<RemintReport>> {
        let (_guard, original, bridged) = self.lock_bridged(address).await?;
        let Some(bridged) = bridged else {
            return Ok(Outcome::NotBridged {
                original_address: original,
            });
        };

        info!(collection = %original, bridged = %bridged, "Starting remint");

        if let Some(failure) = self.check_requirements(original, options).await? {
            return Ok(Outcome::ValidationFailed {
                original_address: original,
                failure,
            });
        }

        let holders = get_holders(self.index.as_ref(), original).await?;
        let Some(standard) = holders.standard() else {
            return Err(BridgeError::NoHolders(original).into());
        };

        let airdrop_txs = airdrop_holders(
            self.target.as_ref(),
            bridged,
            holders.units(),
            self.settings.airdrop_token_budget,
        )
        .await?;

        let data = if standard.is_721() {
            Some(get_collection_data(self.source.as_ref(), original).await?)
        } else {
            None
        };
        let uri_txs = self
            .backfill_uris(original, bridged, standard, data.as_ref())
            .await?;

        info!(
            collection = %original,
            bridged = %bridged,
            holders = holders.len(),
            "Remint complete"
        );

        Ok(Outcome::Complete(RemintReport {
            original_address: original,
            bridged_address: bridged,
            standard,
            holders: holders.len(),
            airdrop_txs,
            uri_txs,
        }))
    }
}
