//! In-process per-collection locks
//!
//! Flows that resolve the registry and then write hold the lock for the
//! original collection address for their whole duration. A second flow on
//! the same collection fails fast instead of waiting.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use eyre::{eyre, Result};
use tracing::debug;

use crate::error::BridgeError;

#[derive(Debug, Clone, Default)]
pub struct CollectionLocks {
    held: Arc<Mutex<HashSet<Address>>>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `collection`, or fail with `OperationInProgress`
    pub fn acquire(&self, collection: Address) -> Result<CollectionGuard> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| eyre!("Collection lock table poisoned"))?;

        if !held.insert(collection) {
            return Err(BridgeError::OperationInProgress(collection).into());
        }

        debug!(collection = %collection, "Collection lock acquired");
        Ok(CollectionGuard {
            held: Arc::clone(&self.held),
            collection,
        })
    }

    pub fn is_locked(&self, collection: &Address) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(collection))
            .unwrap_or(false)
    }
}

/// Releases the collection lock on drop
#[derive(Debug)]
pub struct CollectionGuard {
    held: Arc<Mutex<HashSet<Address>>>,
    collection: Address,
}

impl Drop for CollectionGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.collection);
        }
        debug!(collection = %self.collection, "Collection lock released");
    }
}
