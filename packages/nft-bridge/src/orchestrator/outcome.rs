//! Flow results
//!
//! A flow either completes with a report or stops at a gate. Gate stops are
//! ordinary results, not errors.

use alloy::primitives::Address;
use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{RoyaltyInfo, TokenStandard, TxHandle};
use crate::validation::ValidationFailure;

/// Result of a bridging flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    Complete(R),
    /// The collection already has a bridged counterpart
    AlreadyBridged {
        original_address: Address,
        bridged_address: Address,
    },
    /// The flow needs an existing bridged collection and there is none
    NotBridged { original_address: Address },
    NotApproved { original_address: Address },
    ValidationFailed {
        original_address: Address,
        failure: ValidationFailure,
    },
    /// Deploy transaction went out but the registry still has no entry
    DeployFailed {
        original_address: Address,
        deployment_tx: TxHandle,
    },
}

impl<R> Outcome<R> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }

    pub fn complete(self) -> Option<R> {
        match self {
            Outcome::Complete(report) => Some(report),
            _ => None,
        }
    }

    /// Name of the terminal state
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Complete(_) => "complete",
            Outcome::AlreadyBridged { .. } => "already_bridged",
            Outcome::NotBridged { .. } => "not_bridged",
            Outcome::NotApproved { .. } => "not_approved",
            Outcome::ValidationFailed { .. } => "validation_failed",
            Outcome::DeployFailed { .. } => "deploy_failed",
        }
    }
}

impl<R: Serialize> Outcome<R> {
    /// Caller-facing JSON: the report on success, `{error, original_address, ...}` otherwise
    pub fn to_response(&self) -> Value {
        match self {
            Outcome::Complete(report) => {
                serde_json::to_value(report).unwrap_or_else(|e| json!({ "error": e.to_string() }))
            }
            Outcome::AlreadyBridged {
                original_address,
                bridged_address,
            } => json!({
                "error": "Collection already bridged",
                "status": self.status(),
                "original_address": original_address,
                "bridged_address": bridged_address,
            }),
            Outcome::NotBridged { original_address } => json!({
                "error": "Collection not yet bridged",
                "status": self.status(),
                "original_address": original_address,
            }),
            Outcome::NotApproved { original_address } => json!({
                "error": "Collection not approved for bridging",
                "status": self.status(),
                "original_address": original_address,
            }),
            Outcome::ValidationFailed {
                original_address,
                failure,
            } => json!({
                "error": format!("Collection validation failed: {}", failure),
                "status": self.status(),
                "original_address": original_address,
                "metric": failure.metric(),
            }),
            Outcome::DeployFailed {
                original_address,
                deployment_tx,
            } => json!({
                "error": "Failed to deploy contract to target chain",
                "status": self.status(),
                "original_address": original_address,
                "deployment_tx": deployment_tx,
            }),
        }
    }
}

/// Completed bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeReport {
    pub original_address: Address,
    pub bridged_address: Address,
    pub standard: TokenStandard,
    pub owner: Address,
    pub royalty: RoyaltyInfo,
    pub holders: usize,
    pub deployment_tx: TxHandle,
    pub airdrop_txs: Vec<TxHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_txs: Option<Vec<TxHandle>>,
}

/// Holders replayed onto an existing bridged collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemintReport {
    pub original_address: Address,
    pub bridged_address: Address,
    pub standard: TokenStandard,
    pub holders: usize,
    pub airdrop_txs: Vec<TxHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_txs: Option<Vec<TxHandle>>,
}

/// Every bridged token minted to the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReclaimReport {
    pub original_address: Address,
    pub bridged_address: Address,
    pub admin: Address,
    /// `None` when the index had no holders
    pub standard: Option<TokenStandard>,
    pub airdrop_txs: Vec<TxHandle>,
}

/// Reclaim, clear, redeploy and re-airdrop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebridgeReport {
    pub original_address: Address,
    pub previous_bridged_address: Address,
    pub bridged_address: Address,
    pub standard: TokenStandard,
    pub owner: Address,
    pub royalty: RoyaltyInfo,
    pub holders: usize,
    pub reclaim_txs: Vec<TxHandle>,
    pub clear_tx: TxHandle,
    pub deployment_tx: TxHandle,
    pub airdrop_txs: Vec<TxHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_txs: Option<Vec<TxHandle>>,
}

/// Bridged storage cleared for a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub original_address: Address,
    pub bridged_address: Address,
    pub clear_tx: TxHandle,
}

/// URIs replayed by the set-URIs flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UriReport {
    pub original_address: Address,
    pub bridged_address: Address,
    pub mode: &'static str,
    pub start_index: u64,
    pub uri_txs: Vec<TxHandle>,
}

/// Which side of the registry an address is on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub original_address: Address,
    /// `None` when the collection has not been bridged
    pub bridged_address: Option<Address>,
    /// The queried address was the bridged one
    pub input_is_bridged: bool,
}
