//! Ownership replay onto a bridged collection

use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{debug, info};

use crate::chain::TargetChain;
use crate::chunk::{chunk, chunk_airdrop_units};
use crate::error::BridgeError;
use crate::types::{AirdropUnit, TxHandle};

/// Replay `units` in chunks of at most `max_tokens` token ids, one
/// transaction per chunk. All units must share one token standard.
pub async fn airdrop_holders(
    target: &dyn TargetChain,
    bridged: Address,
    units: &[AirdropUnit],
    max_tokens: usize,
) -> Result<Vec<TxHandle>> {
    let Some(first) = units.first() else {
        return Ok(Vec::new());
    };
    let is721 = first.is721;
    if let Some(mixed) = units.iter().find(|u| u.is721 != is721) {
        return Err(BridgeError::MixedTokenStandards {
            holder: mixed.address,
        }
        .into());
    }

    let mut txs = Vec::new();
    for group in chunk_airdrop_units(units, max_tokens) {
        debug!(
            bridged = %bridged,
            units = group.len(),
            tokens = group.iter().map(AirdropUnit::token_count).sum::<usize>(),
            "Airdropping chunk"
        );
        let tx = if is721 {
            target.airdrop721(bridged, group).await?
        } else {
            target.airdrop1155(bridged, group).await?
        };
        txs.push(tx);
    }

    info!(
        bridged = %bridged,
        holders = units.len(),
        txs = txs.len(),
        "Airdrop complete"
    );

    Ok(txs)
}

/// Pack every ERC-721 token id into admin-owned units of at most
/// `max_tokens` ids, in holder order
pub fn admin_units_721(admin: Address, units: &[AirdropUnit], max_tokens: usize) -> Vec<AirdropUnit> {
    let token_ids: Vec<_> = units.iter().flat_map(|u| u.token_ids.iter().copied()).collect();

    chunk(&token_ids, max_tokens)
        .map(|ids| AirdropUnit {
            address: admin,
            token_ids: ids.to_vec(),
            amounts: vec![U256::from(1); ids.len()],
            is721: true,
            data: Default::default(),
        })
        .collect()
}

/// Re-address ERC-1155 units to the admin, keeping ids and amounts
pub fn admin_units_1155(admin: Address, units: &[AirdropUnit]) -> Vec<AirdropUnit> {
    units
        .iter()
        .map(|u| AirdropUnit {
            address: admin,
            is721: false,
            ..u.clone()
        })
        .collect()
}
