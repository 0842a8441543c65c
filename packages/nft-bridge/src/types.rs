//! Common types for collection bridging
//!
//! Holder positions, royalty and metadata records, and transaction handles
//! shared by the inspector, replicator and orchestrator.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Serialize, Serializer};
use std::fmt;

/// ERC-165 interface id for ERC-1155
pub const ERC1155_INTERFACE_ID: [u8; 4] = [0xd9, 0xb6, 0x7a, 0x26];

/// Inline metadata prefix; URIs carrying it are expensive to store on-chain
pub const DATA_URI_PREFIX: &str = "data:application/json;base64,";

// ============================================================================
// Token standard
// ============================================================================

/// Ownership model of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenStandard {
    /// One owner per token id
    Erc721,
    /// Per-id quantities
    Erc1155,
}

impl TokenStandard {
    pub fn from_is721(is721: bool) -> Self {
        if is721 {
            TokenStandard::Erc721
        } else {
            TokenStandard::Erc1155
        }
    }

    pub fn is_721(&self) -> bool {
        matches!(self, TokenStandard::Erc721)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStandard::Erc721 => "ERC721",
            TokenStandard::Erc1155 => "ERC1155",
        }
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Airdrop units
// ============================================================================

/// One holder's aggregated position, ready to be replayed on the target chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropUnit {
    /// Receiving account
    pub address: Address,
    /// Token ids in first-seen order
    pub token_ids: Vec<U256>,
    /// Per-token quantities, parallel to `token_ids`. Only sent for ERC-1155.
    pub amounts: Vec<U256>,
    /// Fixed when the holder is first seen
    pub is721: bool,
    /// Auxiliary payload for the ERC-1155 replay call
    pub data: Bytes,
}

impl AirdropUnit {
    pub fn new(address: Address, is721: bool) -> Self {
        Self {
            address,
            token_ids: Vec::new(),
            amounts: Vec::new(),
            is721,
            data: Bytes::new(),
        }
    }

    /// Append one token position
    pub fn push(&mut self, token_id: U256, amount: U256) {
        self.token_ids.push(token_id);
        self.amounts.push(amount);
    }

    pub fn token_count(&self) -> usize {
        self.token_ids.len()
    }

    pub fn standard(&self) -> TokenStandard {
        TokenStandard::from_is721(self.is721)
    }
}

// ============================================================================
// Collection metadata
// ============================================================================

/// Royalty configuration carried over to the bridged contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoyaltyInfo {
    pub recipient: Address,
    /// Fee in basis points
    #[serde(serialize_with = "serialize_decimal")]
    pub fee: U256,
}

/// Metadata read from the source collection's sample token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionData {
    pub name: String,
    pub symbol: String,
    /// Empty when the sample URI is not a `<base>/<n>[.json]` template
    pub base_uri: String,
    pub has_extension: bool,
    pub extension: String,
}

impl CollectionData {
    /// Whether the target contract can serve URIs from `base_uri` alone
    pub fn has_uri_template(&self) -> bool {
        !self.base_uri.is_empty()
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// Handle to a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxHandle {
    pub hash: TxHash,
    /// True when the receipt was fetched and its status checked
    pub confirmed: bool,
}

impl TxHandle {
    pub fn submitted(hash: TxHash) -> Self {
        Self {
            hash,
            confirmed: false,
        }
    }

    pub fn confirmed(hash: TxHash) -> Self {
        Self {
            hash,
            confirmed: true,
        }
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{:x}", self.hash)
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.hash)
    }
}

/// Serialize a U256 as a plain decimal string
pub(crate) fn serialize_decimal<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
