//! Bridge configuration
//!
//! Loaded from the environment (after `.env`), like the other bridge
//! services.

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::validation::ValidationPolicy;

pub const DEFAULT_NFT_INDEX_URL: &str = "https://api.paintswap.finance";
pub const DEFAULT_ROYALTY_REGISTRY: &str = "0x809D88B727c4C7024462d7955777835938F02F3B";
pub const DEFAULT_MULTICALL: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

pub const DEFAULT_AIRDROP_TOKEN_BUDGET: usize = 50;
pub const DEFAULT_RECLAIM_TOKEN_BUDGET: usize = 25;
pub const DEFAULT_INDEX_TIMEOUT_SECS: u64 = 60;

/// Deployment environment, selects the default block explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEnv {
    Development,
    Testnet,
    Prod,
}

impl BridgeEnv {
    pub fn default_explorer_tx_url(&self) -> &'static str {
        match self {
            BridgeEnv::Prod => "https://sonicscan.org/tx/",
            BridgeEnv::Development | BridgeEnv::Testnet => "https://testnet.soniclabs.com/tx/",
        }
    }
}

impl FromStr for BridgeEnv {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BridgeEnv::Development),
            "testnet" => Ok(BridgeEnv::Testnet),
            "prod" | "production" => Ok(BridgeEnv::Prod),
            other => Err(eyre!("Invalid BRIDGE_ENV: {}", other)),
        }
    }
}

/// Bridge configuration
#[derive(Clone)]
pub struct Config {
    /// Source (original collection) chain RPC URL
    pub source_rpc_url: String,
    pub source_chain_id: u64,
    /// Target (bridged collection) chain RPC URL
    pub target_rpc_url: String,
    pub target_chain_id: u64,

    /// Bridge control contract on the target chain
    pub bridge_control_address: Address,
    /// Key of the deployer/admin account that signs every target write
    pub deployer_private_key: String,

    /// NFT index base URL
    pub nft_index_url: String,
    pub index_timeout: Duration,

    /// Royalty registry on the source chain
    pub royalty_registry_address: Address,
    /// Multicall3 on the source chain
    pub multicall_address: Address,

    pub bridge_env: BridgeEnv,
    /// Prefix for transaction links, hash is appended
    pub explorer_tx_url: String,

    pub max_total_nfts: u64,
    pub max_owners: u64,
    pub require_recent_sale: bool,

    /// Max token ids per airdrop transaction
    pub airdrop_token_budget: usize,
    /// Max token ids per reclaim transaction
    pub reclaim_token_budget: usize,

    /// Wait for each receipt and fail on revert
    pub wait_for_receipts: bool,
}

/// Custom Debug that redacts the deployer key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("source_rpc_url", &self.source_rpc_url)
            .field("source_chain_id", &self.source_chain_id)
            .field("target_rpc_url", &self.target_rpc_url)
            .field("target_chain_id", &self.target_chain_id)
            .field("bridge_control_address", &self.bridge_control_address)
            .field("deployer_private_key", &"<redacted>")
            .field("nft_index_url", &self.nft_index_url)
            .field("index_timeout", &self.index_timeout)
            .field("royalty_registry_address", &self.royalty_registry_address)
            .field("multicall_address", &self.multicall_address)
            .field("bridge_env", &self.bridge_env)
            .field("explorer_tx_url", &self.explorer_tx_url)
            .field("max_total_nfts", &self.max_total_nfts)
            .field("max_owners", &self.max_owners)
            .field("require_recent_sale", &self.require_recent_sale)
            .field("airdrop_token_budget", &self.airdrop_token_budget)
            .field("reclaim_token_budget", &self.reclaim_token_budget)
            .field("wait_for_receipts", &self.wait_for_receipts)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `load` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| eyre!("{} required", key));
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bridge_env = match optional("BRIDGE_ENV") {
            Some(v) => v.parse()?,
            None => BridgeEnv::Development,
        };

        let defaults = ValidationPolicy::default();

        let config = Self {
            source_rpc_url: required("SOURCE_RPC_URL")?,
            source_chain_id: required("SOURCE_CHAIN_ID")?
                .parse()
                .map_err(|_| eyre!("Invalid SOURCE_CHAIN_ID"))?,
            target_rpc_url: required("TARGET_RPC_URL")?,
            target_chain_id: required("TARGET_CHAIN_ID")?
                .parse()
                .map_err(|_| eyre!("Invalid TARGET_CHAIN_ID"))?,

            bridge_control_address: parse_address(
                "BRIDGE_CONTROL_ADDRESS",
                &required("BRIDGE_CONTROL_ADDRESS")?,
            )?,
            deployer_private_key: required("DEPLOYER_PRIVATE_KEY")?,

            nft_index_url: optional("NFT_INDEX_URL")
                .unwrap_or_else(|| DEFAULT_NFT_INDEX_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            index_timeout: Duration::from_secs(
                optional("INDEX_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_INDEX_TIMEOUT_SECS),
            ),

            royalty_registry_address: parse_address(
                "ROYALTY_REGISTRY_ADDRESS",
                &optional("ROYALTY_REGISTRY_ADDRESS")
                    .unwrap_or_else(|| DEFAULT_ROYALTY_REGISTRY.to_string()),
            )?,
            multicall_address: parse_address(
                "MULTICALL_ADDRESS",
                &optional("MULTICALL_ADDRESS").unwrap_or_else(|| DEFAULT_MULTICALL.to_string()),
            )?,

            bridge_env,
            explorer_tx_url: optional("EXPLORER_TX_URL")
                .unwrap_or_else(|| bridge_env.default_explorer_tx_url().to_string()),

            max_total_nfts: optional("MAX_TOTAL_NFTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_total_nfts),
            max_owners: optional("MAX_OWNERS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_owners),
            require_recent_sale: optional("REQUIRE_RECENT_SALE")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.require_recent_sale),

            airdrop_token_budget: optional("AIRDROP_TOKEN_BUDGET")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_AIRDROP_TOKEN_BUDGET),
            reclaim_token_budget: optional("RECLAIM_TOKEN_BUDGET")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RECLAIM_TOKEN_BUDGET),

            wait_for_receipts: optional("WAIT_FOR_RECEIPTS")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source_rpc_url.is_empty() {
            return Err(eyre!("SOURCE_RPC_URL cannot be empty"));
        }
        if self.target_rpc_url.is_empty() {
            return Err(eyre!("TARGET_RPC_URL cannot be empty"));
        }
        if self.source_chain_id == self.target_chain_id {
            return Err(eyre!(
                "SOURCE_CHAIN_ID and TARGET_CHAIN_ID must differ (both {})",
                self.source_chain_id
            ));
        }
        let key = self.deployer_private_key.trim_start_matches("0x");
        if key.len() != 64 {
            return Err(eyre!(
                "DEPLOYER_PRIVATE_KEY must be 64 hex chars (optionally 0x-prefixed)"
            ));
        }
        if self.airdrop_token_budget == 0 || self.reclaim_token_budget == 0 {
            return Err(eyre!("Token budgets must be greater than zero"));
        }
        Ok(())
    }

    /// Eligibility policy from the configured limits
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            max_total_nfts: self.max_total_nfts,
            max_owners: self.max_owners,
            require_recent_sale: self.require_recent_sale,
            ..ValidationPolicy::default()
        }
    }

    /// Explorer link for a transaction hash
    pub fn tx_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .wrap_err_with(|| format!("Invalid {}: {}", key, value))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
