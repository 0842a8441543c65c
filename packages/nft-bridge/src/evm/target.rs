//! Target chain writes through the bridge control
//!
//! Uses `ProviderBuilder::with_recommended_fillers()` so nonce, gas and fees
//! are filled automatically. Every write either waits for its receipt (and
//! fails on revert) or returns as soon as the transaction is accepted,
//! depending on `wait_for_receipts`.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{ProviderBuilder, RootProvider},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use tracing::{debug, info};
use url::Url;

use super::contracts::{AirdropUnit1155, AirdropUnit721, BridgeControl, BridgedToken};
use crate::chain::{ChainContext, Erc1155Deployment, Erc721Deployment, TargetChain};
use crate::types::{AirdropUnit, TxHandle};

/// Send a contract call and turn the pending transaction into a `TxHandle`
macro_rules! submit {
    ($self:expr, $call:expr, $what:expr) => {{
        let call = $call;
        let pending_tx = call
            .send()
            .await
            .map_err(|e| eyre!("Failed to send {} tx: {}", $what, e))?;

        let tx_hash = *pending_tx.tx_hash();
        info!(tx_hash = %tx_hash, "{} transaction sent", $what);

        if $self.wait_for_receipts {
            let receipt = pending_tx
                .get_receipt()
                .await
                .map_err(|e| eyre!("Failed to get {} receipt: {}", $what, e))?;

            if !receipt.status() {
                return Err(eyre!("{} transaction reverted: 0x{:x}", $what, tx_hash));
            }
            debug!(tx_hash = %tx_hash, "{} transaction confirmed", $what);
            Ok(TxHandle::confirmed(tx_hash))
        } else {
            Ok(TxHandle::submitted(tx_hash))
        }
    }};
}

/// Signing client for the bridge control and bridged token contracts
pub struct EvmTargetChain {
    context: ChainContext,
    bridge_control: Address,
    signer: PrivateKeySigner,
    reader: RootProvider<Http<Client>>,
    wait_for_receipts: bool,
}

impl EvmTargetChain {
    pub fn new(
        context: ChainContext,
        bridge_control: Address,
        private_key: &str,
        wait_for_receipts: bool,
    ) -> Result<Self> {
        let signer: PrivateKeySigner = private_key.parse().wrap_err("Invalid private key")?;
        let reader = ProviderBuilder::new().on_http(context.rpc_url.parse().wrap_err("Invalid RPC URL")?);

        info!(
            operator = %signer.address(),
            bridge_control = %bridge_control,
            chain_id = context.chain_id,
            chain = %context.binding,
            wait_for_receipts,
            "Target chain client initialized"
        );

        Ok(Self {
            context,
            bridge_control,
            signer,
            reader,
            wait_for_receipts,
        })
    }

    fn rpc_url(&self) -> Result<Url> {
        self.context.rpc_url.parse().wrap_err("Invalid RPC URL")
    }
}

fn to_units721(units: &[AirdropUnit]) -> Vec<AirdropUnit721> {
    units
        .iter()
        .map(|u| AirdropUnit721 {
            to: u.address,
            tokenIds: u.token_ids.clone(),
        })
        .collect()
}

fn to_units1155(units: &[AirdropUnit]) -> Vec<AirdropUnit1155> {
    units
        .iter()
        .map(|u| AirdropUnit1155 {
            to: u.address,
            tokenIds: u.token_ids.clone(),
            amounts: u.amounts.clone(),
            data: u.data.clone(),
        })
        .collect()
}

#[async_trait]
impl TargetChain for EvmTargetChain {
    fn context(&self) -> &ChainContext {
        &self.context
    }

    fn operator_address(&self) -> Address {
        self.signer.address()
    }

    async fn bridged_address_for_original(&self, original: Address) -> Result<Address> {
        let contract = BridgeControl::new(self.bridge_control, &self.reader);
        let result = contract
            .bridgedAddressForOriginal(original)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get bridged address: {}", e))?;
        Ok(result._0)
    }

    async fn original_address_for_bridged(&self, bridged: Address) -> Result<Address> {
        let contract = BridgeControl::new(self.bridge_control, &self.reader);
        let result = contract
            .originalAddressForBridged(bridged)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get original address: {}", e))?;
        Ok(result._0)
    }

    async fn bridging_approved(&self, original: Address) -> Result<bool> {
        let contract = BridgeControl::new(self.bridge_control, &self.reader);
        let result = contract
            .bridgingApproved(original)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get bridging approval: {}", e))?;
        Ok(result._0)
    }

    async fn set_bridging_approved(&self, collection: Address, approved: bool) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        debug!(collection = %collection, approved, "Submitting adminSetBridgingApproved");
        submit!(self, contract.adminSetBridgingApproved(collection, approved), "approval")
    }

    async fn deploy_erc721(&self, d: &Erc721Deployment) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        debug!(
            original = %d.original,
            owner = %d.owner,
            base_uri = %d.base_uri,
            enumerable = d.enumerable,
            "Submitting deployERC721"
        );
        submit!(
            self,
            contract.deployERC721(
                d.original,
                d.owner,
                d.name.clone(),
                d.symbol.clone(),
                d.base_uri.clone(),
                d.extension.clone(),
                d.royalty.recipient,
                d.royalty.fee,
                d.enumerable,
            ),
            "deployERC721"
        )
    }

    async fn deploy_erc1155(&self, d: &Erc1155Deployment) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        debug!(original = %d.original, owner = %d.owner, "Submitting deployERC1155");
        submit!(
            self,
            contract.deployERC1155(
                d.original,
                d.owner,
                d.royalty.recipient,
                d.royalty.fee,
                d.name.clone(),
            ),
            "deployERC1155"
        )
    }

    async fn airdrop721(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        submit!(self, contract.airdrop721(bridged, to_units721(units)), "airdrop721")
    }

    async fn airdrop1155(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        submit!(self, contract.airdrop1155(bridged, to_units1155(units)), "airdrop1155")
    }

    async fn batch_set_token_uris(
        &self,
        bridged: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        submit!(
            self,
            contract.batchSetTokenURIs(bridged, start, uris.to_vec()),
            "batchSetTokenURIs"
        )
    }

    async fn clear_bridged_storage(&self, original: Address) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgeControl::new(self.bridge_control, &provider);

        submit!(self, contract.clearBridgedStorage(original), "clearBridgedStorage")
    }

    async fn token_batch_set_token_uris(
        &self,
        token: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgedToken::new(token, &provider);

        submit!(
            self,
            contract.batchSetTokenURIs(start, uris.to_vec()),
            "token batchSetTokenURIs"
        )
    }

    async fn token_set_token_uri(&self, token: Address, token_id: U256, uri: &str) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgedToken::new(token, &provider);

        submit!(
            self,
            contract.setTokenURI(token_id, uri.to_string()),
            "setTokenURI"
        )
    }

    async fn token_owner(&self, token: Address) -> Result<Address> {
        let contract = BridgedToken::new(token, &self.reader);
        let result = contract
            .owner()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get token owner: {}", e))?;
        Ok(result._0)
    }

    async fn token_transfer_ownership(&self, token: Address, new_owner: Address) -> Result<TxHandle> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url()?);
        let contract = BridgedToken::new(token, &provider);

        submit!(
            self,
            contract.transferOwnership(new_owner),
            "transferOwnership"
        )
    }
}
