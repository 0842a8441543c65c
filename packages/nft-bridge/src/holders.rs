//! Holder aggregation
//!
//! Pages through the index and folds every (holder, token) record into one
//! `AirdropUnit` per holder, keeping first-seen order.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{debug, info};

use crate::index::{CollectionIndex, HolderRecord};
use crate::types::{AirdropUnit, TokenStandard};

/// Records requested per index page
pub const HOLDER_PAGE_SIZE: u64 = 1000;

/// Insertion-ordered holder map
#[derive(Debug, Clone, Default)]
pub struct HolderBook {
    units: Vec<AirdropUnit>,
    positions: HashMap<Address, usize>,
}

impl HolderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record: append to the holder's unit or start a new one.
    ///
    /// The first record for a holder decides its `is721` flag.
    pub fn upsert(&mut self, address: Address, token_id: U256, amount: U256, is721: bool) {
        let idx = match self.positions.get(&address) {
            Some(&idx) => idx,
            None => {
                self.units.push(AirdropUnit::new(address, is721));
                self.positions.insert(address, self.units.len() - 1);
                self.units.len() - 1
            }
        };
        self.units[idx].push(token_id, amount);
    }

    pub fn upsert_record(&mut self, record: &HolderRecord) {
        self.upsert(record.user, record.token_id, record.amount, record.is_erc721);
    }

    pub fn get(&self, address: &Address) -> Option<&AirdropUnit> {
        self.positions.get(address).map(|&idx| &self.units[idx])
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.units.iter().map(AirdropUnit::token_count).sum()
    }

    /// Standard of the collection, taken from the first holder
    pub fn standard(&self) -> Option<TokenStandard> {
        self.units.first().map(AirdropUnit::standard)
    }

    pub fn units(&self) -> &[AirdropUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<AirdropUnit> {
        self.units
    }
}

/// Fetch every holder of `collection`.
///
/// Stops at the first page shorter than [`HOLDER_PAGE_SIZE`]. A malformed
/// page aborts the whole fetch.
pub async fn get_holders(index: &dyn CollectionIndex, collection: Address) -> Result<HolderBook> {
    let mut book = HolderBook::new();
    let mut num_to_skip = 0u64;

    loop {
        let page = index
            .holder_page(collection, num_to_skip, HOLDER_PAGE_SIZE)
            .await?;

        debug!(
            collection = %collection,
            num_to_skip,
            records = page.len(),
            "Merged holder page"
        );

        for record in &page {
            book.upsert_record(record);
        }

        if (page.len() as u64) < HOLDER_PAGE_SIZE {
            break;
        }
        num_to_skip += HOLDER_PAGE_SIZE;
    }

    info!(
        collection = %collection,
        holders = book.len(),
        tokens = book.token_count(),
        "Aggregated holders"
    );

    Ok(book)
}
