//! Fake NFT index

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};

use crate::error::BridgeError;
use crate::index::{CollectionCounts, CollectionIndex, CollectionStats, HolderRecord};

#[derive(Debug, Default)]
struct IndexState {
    stats: HashMap<Address, CollectionStats>,
    records: HashMap<Address, Vec<HolderRecord>>,
    malformed: bool,
    requested_offsets: Vec<u64>,
}

/// Index serving configured stats and holder records
#[derive(Default)]
pub struct FakeIndex {
    state: Mutex<IndexState>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().expect("fake index state poisoned")
    }

    pub fn set_stats(&self, collection: Address, verified: bool, total_nfts: u64, num_owners: u64) {
        self.state().stats.insert(
            collection,
            CollectionStats {
                verified,
                stats: CollectionCounts {
                    total_nfts,
                    num_owners,
                    timestamp_last_sale: None,
                },
            },
        );
    }

    pub fn add_record(&self, collection: Address, user: Address, token_id: u64, amount: u64, is_erc721: bool) {
        self.state()
            .records
            .entry(collection)
            .or_default()
            .push(HolderRecord {
                user,
                token_id: U256::from(token_id),
                amount: U256::from(amount),
                is_erc721,
            });
    }

    /// ERC-721 records, one per (holder, token id)
    pub fn add_721_holders(&self, collection: Address, holdings: &[(Address, u64)]) {
        for (user, token_id) in holdings {
            self.add_record(collection, *user, *token_id, 1, true);
        }
    }

    /// Every holder page answers without the `nfts` field
    pub fn set_malformed(&self, malformed: bool) {
        self.state().malformed = malformed;
    }

    /// `numToSkip` of every holder page request, in order
    pub fn requested_offsets(&self) -> Vec<u64> {
        self.state().requested_offsets.clone()
    }
}

#[async_trait]
impl CollectionIndex for FakeIndex {
    async fn collection_stats(&self, collection: Address) -> Result<CollectionStats> {
        self.state()
            .stats
            .get(&collection)
            .cloned()
            .ok_or_else(|| eyre!("NFT index query failed: 404 Not Found"))
    }

    async fn holder_page(
        &self,
        collection: Address,
        num_to_skip: u64,
        num_to_fetch: u64,
    ) -> Result<Vec<HolderRecord>> {
        let mut state = self.state();
        state.requested_offsets.push(num_to_skip);

        if state.malformed {
            return Err(BridgeError::MalformedIndexResponse {
                field: "nfts",
                body: "{}".to_string(),
            }
            .into());
        }

        let records = state.records.get(&collection).cloned().unwrap_or_default();
        let page = records
            .into_iter()
            .skip(num_to_skip as usize)
            .take(num_to_fetch as usize)
            .collect();
        Ok(page)
    }
}
