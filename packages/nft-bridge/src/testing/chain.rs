//! Fake chains
//!
//! `FakeSourceChain` serves configured collection reads. `FakeTargetChain`
//! keeps a bridge registry in memory and records every write in order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};

use crate::chain::{
    ChainContext, Erc1155Deployment, Erc721Deployment, SourceChain, TargetChain,
};
use crate::types::{AirdropUnit, RoyaltyInfo, TxHandle, ERC1155_INTERFACE_ID};

// ============================================================================
// Source chain
// ============================================================================

#[derive(Debug, Clone, Default)]
struct FakeCollection {
    name: String,
    symbol: String,
    token_uris: BTreeMap<u64, String>,
    owner: Option<Address>,
    total_supply: Option<u64>,
    by_index: Vec<u64>,
    royalty_info: Option<(Address, U256)>,
    registry_royalty: Option<RoyaltyInfo>,
    erc1155: bool,
}

#[derive(Debug, Default)]
struct SourceState {
    collections: HashMap<Address, FakeCollection>,
    uri_batch_starts: Vec<u64>,
}

/// Source chain serving configured collections
pub struct FakeSourceChain {
    context: ChainContext,
    state: Mutex<SourceState>,
}

impl Default for FakeSourceChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSourceChain {
    pub fn new() -> Self {
        Self::with_context(ChainContext::source(250, "memory://source"))
    }

    pub fn with_context(context: ChainContext) -> Self {
        Self {
            context,
            state: Mutex::new(SourceState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().expect("fake source state poisoned")
    }

    fn with_collection<F>(&self, collection: Address, f: F)
    where
        F: FnOnce(&mut FakeCollection),
    {
        let mut state = self.state();
        f(state.collections.entry(collection).or_default());
    }

    pub fn add_collection(&self, collection: Address, name: &str, symbol: &str) {
        self.with_collection(collection, |c| {
            c.name = name.to_string();
            c.symbol = symbol.to_string();
        });
    }

    pub fn set_token_uri(&self, collection: Address, token_id: u64, uri: &str) {
        self.with_collection(collection, |c| {
            c.token_uris.insert(token_id, uri.to_string());
        });
    }

    pub fn set_owner(&self, collection: Address, owner: Address) {
        self.with_collection(collection, |c| c.owner = Some(owner));
    }

    pub fn set_total_supply(&self, collection: Address, supply: u64) {
        self.with_collection(collection, |c| c.total_supply = Some(supply));
    }

    /// Tokens reachable through `tokenByIndex`, with their URIs
    pub fn set_enumerable_tokens(&self, collection: Address, tokens: &[(u64, &str)]) {
        self.with_collection(collection, |c| {
            c.total_supply = Some(tokens.len() as u64);
            c.by_index = tokens.iter().map(|(id, _)| *id).collect();
            for (id, uri) in tokens {
                c.token_uris.insert(*id, uri.to_string());
            }
        });
    }

    /// `royaltyInfo(1, 1 ether)` answer
    pub fn set_royalty_info(&self, collection: Address, receiver: Address, amount: U256) {
        self.with_collection(collection, |c| c.royalty_info = Some((receiver, amount)));
    }

    pub fn set_registry_royalty(&self, collection: Address, royalty: RoyaltyInfo) {
        self.with_collection(collection, |c| c.registry_royalty = Some(royalty));
    }

    pub fn set_erc1155(&self, collection: Address, erc1155: bool) {
        self.with_collection(collection, |c| c.erc1155 = erc1155);
    }

    /// First token id of every batched URI read, in call order
    pub fn uri_batch_starts(&self) -> Vec<u64> {
        self.state().uri_batch_starts.clone()
    }

    fn collection(&self, collection: Address) -> Result<FakeCollection> {
        self.state()
            .collections
            .get(&collection)
            .cloned()
            .ok_or_else(|| eyre!("execution reverted: no contract at {}", collection))
    }
}

#[async_trait]
impl SourceChain for FakeSourceChain {
    fn context(&self) -> &ChainContext {
        &self.context
    }

    async fn name(&self, collection: Address) -> Result<String> {
        Ok(self.collection(collection)?.name)
    }

    async fn symbol(&self, collection: Address) -> Result<String> {
        Ok(self.collection(collection)?.symbol)
    }

    async fn token_uri(&self, collection: Address, token_id: U256) -> Result<String> {
        let c = self.collection(collection)?;
        c.token_uris
            .get(&token_id.saturating_to::<u64>())
            .cloned()
            .ok_or_else(|| eyre!("execution reverted: nonexistent token {}", token_id))
    }

    async fn token_uris(
        &self,
        collection: Address,
        _is721: bool,
        token_ids: &[U256],
    ) -> Result<Vec<Option<String>>> {
        let mut state = self.state();
        if let Some(first) = token_ids.first() {
            state.uri_batch_starts.push(first.saturating_to());
        }
        let uris = match state.collections.get(&collection) {
            Some(c) => token_ids
                .iter()
                .map(|id| c.token_uris.get(&id.saturating_to::<u64>()).cloned())
                .collect(),
            None => vec![None; token_ids.len()],
        };
        Ok(uris)
    }

    async fn total_supply(&self, collection: Address) -> Result<U256> {
        self.collection(collection)?
            .total_supply
            .map(U256::from)
            .ok_or_else(|| eyre!("execution reverted: totalSupply"))
    }

    async fn token_by_index(&self, collection: Address, index: U256) -> Result<U256> {
        let c = self.collection(collection)?;
        c.by_index
            .get(index.saturating_to::<usize>())
            .map(|id| U256::from(*id))
            .ok_or_else(|| eyre!("execution reverted: index out of bounds"))
    }

    async fn owner(&self, collection: Address) -> Result<Address> {
        self.collection(collection)?
            .owner
            .ok_or_else(|| eyre!("execution reverted: owner"))
    }

    async fn royalty_info(
        &self,
        collection: Address,
        _token_id: U256,
        _sale_price: U256,
    ) -> Result<(Address, U256)> {
        self.collection(collection)?
            .royalty_info
            .ok_or_else(|| eyre!("execution reverted: royaltyInfo"))
    }

    async fn registry_royalty(&self, collection: Address) -> Result<RoyaltyInfo> {
        self.collection(collection)?
            .registry_royalty
            .ok_or_else(|| eyre!("execution reverted: collectionRoyalties"))
    }

    async fn supports_interface(&self, collection: Address, interface_id: [u8; 4]) -> Result<bool> {
        let c = self.collection(collection)?;
        Ok(c.erc1155 && interface_id == ERC1155_INTERFACE_ID)
    }
}

// ============================================================================
// Target chain
// ============================================================================

/// A write submitted to the fake target chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetWrite {
    SetBridgingApproved {
        collection: Address,
        approved: bool,
    },
    DeployErc721(Erc721Deployment),
    DeployErc1155(Erc1155Deployment),
    Airdrop721 {
        bridged: Address,
        units: Vec<AirdropUnit>,
    },
    Airdrop1155 {
        bridged: Address,
        units: Vec<AirdropUnit>,
    },
    BatchSetTokenUris {
        bridged: Address,
        start: U256,
        uris: Vec<String>,
    },
    ClearBridgedStorage {
        original: Address,
    },
    TokenBatchSetTokenUris {
        token: Address,
        start: U256,
        uris: Vec<String>,
    },
    TokenSetTokenUri {
        token: Address,
        token_id: U256,
        uri: String,
    },
    TransferOwnership {
        token: Address,
        new_owner: Address,
    },
}

#[derive(Debug, Default)]
struct TargetState {
    bridged_for: HashMap<Address, Address>,
    original_for: HashMap<Address, Address>,
    approved: HashSet<Address>,
    token_owners: HashMap<Address, Address>,
    writes: Vec<TargetWrite>,
    tx_count: u64,
    deployments: u8,
    skip_registration: bool,
    fail_token_batch_uris: bool,
}

impl TargetState {
    fn record(&mut self, write: TargetWrite) -> TxHandle {
        self.writes.push(write);
        self.tx_count += 1;
        TxHandle::confirmed(TxHash::left_padding_from(&self.tx_count.to_be_bytes()))
    }

    fn register_deployment(&mut self, original: Address) {
        if self.skip_registration {
            return;
        }
        self.deployments += 1;
        let mut bytes = [0xb0u8; 20];
        bytes[19] = self.deployments;
        let bridged = Address::from(bytes);
        self.bridged_for.insert(original, bridged);
        self.original_for.insert(bridged, original);
    }
}

/// Target chain with an in-memory bridge registry
pub struct FakeTargetChain {
    context: ChainContext,
    operator: Address,
    state: Mutex<TargetState>,
}

impl Default for FakeTargetChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTargetChain {
    /// Operator account used by every fake target
    pub const OPERATOR: Address = Address::repeat_byte(0xad);

    pub fn new() -> Self {
        Self::with_context(ChainContext::target(146, "memory://target"))
    }

    pub fn with_context(context: ChainContext) -> Self {
        Self {
            context,
            operator: Self::OPERATOR,
            state: Mutex::new(TargetState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TargetState> {
        self.state.lock().expect("fake target state poisoned")
    }

    /// Pre-existing bridge registry entry
    pub fn register_bridged(&self, original: Address, bridged: Address) {
        let mut state = self.state();
        state.bridged_for.insert(original, bridged);
        state.original_for.insert(bridged, original);
    }

    pub fn approve(&self, original: Address) {
        self.state().approved.insert(original);
    }

    pub fn set_token_owner(&self, token: Address, owner: Address) {
        self.state().token_owners.insert(token, owner);
    }

    /// Deploy transactions succeed but never show up in the registry
    pub fn skip_registration(&self, skip: bool) {
        self.state().skip_registration = skip;
    }

    /// Token-level `batchSetTokenURIs` reverts
    pub fn fail_token_batch_uris(&self, fail: bool) {
        self.state().fail_token_batch_uris = fail;
    }

    pub fn writes(&self) -> Vec<TargetWrite> {
        self.state().writes.clone()
    }

    pub fn bridged_for(&self, original: Address) -> Option<Address> {
        self.state().bridged_for.get(&original).copied()
    }
}

#[async_trait]
impl TargetChain for FakeTargetChain {
    fn context(&self) -> &ChainContext {
        &self.context
    }

    fn operator_address(&self) -> Address {
        self.operator
    }

    async fn bridged_address_for_original(&self, original: Address) -> Result<Address> {
        Ok(self.bridged_for(original).unwrap_or(Address::ZERO))
    }

    async fn original_address_for_bridged(&self, bridged: Address) -> Result<Address> {
        Ok(self
            .state()
            .original_for
            .get(&bridged)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn bridging_approved(&self, original: Address) -> Result<bool> {
        Ok(self.state().approved.contains(&original))
    }

    async fn set_bridging_approved(&self, collection: Address, approved: bool) -> Result<TxHandle> {
        let mut state = self.state();
        if approved {
            state.approved.insert(collection);
        } else {
            state.approved.remove(&collection);
        }
        Ok(state.record(TargetWrite::SetBridgingApproved {
            collection,
            approved,
        }))
    }

    async fn deploy_erc721(&self, deployment: &Erc721Deployment) -> Result<TxHandle> {
        let mut state = self.state();
        state.register_deployment(deployment.original);
        Ok(state.record(TargetWrite::DeployErc721(deployment.clone())))
    }

    async fn deploy_erc1155(&self, deployment: &Erc1155Deployment) -> Result<TxHandle> {
        let mut state = self.state();
        state.register_deployment(deployment.original);
        Ok(state.record(TargetWrite::DeployErc1155(deployment.clone())))
    }

    async fn airdrop721(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle> {
        Ok(self.state().record(TargetWrite::Airdrop721 {
            bridged,
            units: units.to_vec(),
        }))
    }

    async fn airdrop1155(&self, bridged: Address, units: &[AirdropUnit]) -> Result<TxHandle> {
        Ok(self.state().record(TargetWrite::Airdrop1155 {
            bridged,
            units: units.to_vec(),
        }))
    }

    async fn batch_set_token_uris(
        &self,
        bridged: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle> {
        Ok(self.state().record(TargetWrite::BatchSetTokenUris {
            bridged,
            start,
            uris: uris.to_vec(),
        }))
    }

    async fn clear_bridged_storage(&self, original: Address) -> Result<TxHandle> {
        let mut state = self.state();
        if let Some(bridged) = state.bridged_for.remove(&original) {
            state.original_for.remove(&bridged);
        }
        Ok(state.record(TargetWrite::ClearBridgedStorage { original }))
    }

    async fn token_batch_set_token_uris(
        &self,
        token: Address,
        start: U256,
        uris: &[String],
    ) -> Result<TxHandle> {
        let mut state = self.state();
        if state.fail_token_batch_uris {
            return Err(eyre!("execution reverted: batchSetTokenURIs"));
        }
        Ok(state.record(TargetWrite::TokenBatchSetTokenUris {
            token,
            start,
            uris: uris.to_vec(),
        }))
    }

    async fn token_set_token_uri(&self, token: Address, token_id: U256, uri: &str) -> Result<TxHandle> {
        Ok(self.state().record(TargetWrite::TokenSetTokenUri {
            token,
            token_id,
            uri: uri.to_string(),
        }))
    }

    async fn token_owner(&self, token: Address) -> Result<Address> {
        self.state()
            .token_owners
            .get(&token)
            .copied()
            .ok_or_else(|| eyre!("execution reverted: owner"))
    }

    async fn token_transfer_ownership(&self, token: Address, new_owner: Address) -> Result<TxHandle> {
        let mut state = self.state();
        state.token_owners.insert(token, new_owner);
        Ok(state.record(TargetWrite::TransferOwnership { token, new_owner }))
    }
}
