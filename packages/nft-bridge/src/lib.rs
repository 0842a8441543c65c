//! NFT Bridge: migrates NFT collections between EVM chains
//!
//! A collection on the source chain is validated against the NFT index,
//! deployed as a bridged counterpart through the bridge control contract on
//! the target chain, and its ownership (and where needed, per-token URIs) is
//! replayed onto the new contract.
//!
//! - **Chain capabilities** - `SourceChain` reads, `TargetChain` writes, each bound to a `ChainContext`
//! - **Index** - collection stats and paginated holder records over HTTP
//! - **Holders** - insertion-ordered aggregation into `AirdropUnit`s
//! - **Inspector** - metadata, royalty and ownership reads with fallbacks
//! - **Replicator** - token URI reads and batched writes
//! - **Orchestrator** - bridge, remint, reclaim, rebridge and maintenance flows
//!
//! ## Feature Flags
//!
//! - `testing` - in-memory chain and index fakes

pub mod chain;
pub mod chunk;
pub mod config;
pub mod error;
pub mod evm;
pub mod holders;
pub mod index;
pub mod inspector;
pub mod orchestrator;
pub mod replicator;
pub mod types;
pub mod uri;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chain::{ChainBinding, ChainContext, SourceChain, TargetChain};
pub use config::{BridgeEnv, Config};
pub use error::BridgeError;
pub use evm::{EvmSourceChain, EvmTargetChain};
pub use index::{CollectionIndex, CollectionStats, HolderRecord, PaintswapIndex};
pub use orchestrator::{
    BridgeOptions, BridgeSettings, NftBridge, Outcome, Progress, SetUrisMode,
};
pub use types::{AirdropUnit, CollectionData, RoyaltyInfo, TokenStandard, TxHandle};
pub use validation::{ValidationFailure, ValidationPolicy};
