//! Token URI replication
//!
//! Reads per-token URIs from the original collection and writes them to the
//! bridged one, either through the bridge control or directly on the token
//! contract. Missing URIs are gaps, never errors.

use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{debug, info, warn};

use crate::chain::{SourceChain, TargetChain};
use crate::types::TxHandle;
use crate::uri::{plan_uri_batches, UriBatch};

/// Token ids read per batched call
pub const URI_READ_BATCH: u64 = 100;

/// Read token URIs for ids 0, 1, 2, ... until a batch ends in a missing URI.
///
/// Interior gaps stay in place as `None`; only the trailing run of `None`
/// is dropped.
pub async fn get_token_uris(
    source: &dyn SourceChain,
    collection: Address,
    is721: bool,
) -> Result<Vec<Option<String>>> {
    let mut uris: Vec<Option<String>> = Vec::new();
    let mut start = 0u64;

    loop {
        let ids: Vec<U256> = (start..start + URI_READ_BATCH).map(U256::from).collect();
        let batch = source.token_uris(collection, is721, &ids).await?;

        debug!(
            collection = %collection,
            start,
            found = batch.iter().filter(|u| u.is_some()).count(),
            "Read token URI batch"
        );

        let reached_end = batch.last().map_or(true, Option::is_none);
        uris.extend(batch);
        if reached_end {
            break;
        }
        start += URI_READ_BATCH;
    }

    while matches!(uris.last(), Some(None)) {
        uris.pop();
    }

    info!(
        collection = %collection,
        uris = uris.len(),
        "Collected token URIs"
    );

    Ok(uris)
}

/// Replay `uris` onto a bridged collection through the bridge control.
///
/// See [`plan_uri_batches`] for how `start_from` and gaps are handled.
pub async fn set_token_uris(
    target: &dyn TargetChain,
    bridged: Address,
    uris: &[Option<String>],
    start_from: Option<u64>,
) -> Result<Vec<TxHandle>> {
    if uris.is_empty() {
        info!(bridged = %bridged, "Token URI list is empty, nothing to set");
        return Ok(Vec::new());
    }

    let mut txs = Vec::new();
    for batch in plan_uri_batches(uris, start_from) {
        log_batch(bridged, &batch);
        let tx = target
            .batch_set_token_uris(bridged, U256::from(batch.start), &batch.uris)
            .await?;
        txs.push(tx);
    }

    Ok(txs)
}

/// Replay `uris` directly on the token contract, bypassing the bridge control.
///
/// A batch the contract rejects is retried one token at a time with
/// `setTokenURI`.
pub async fn set_token_uris_direct(
    target: &dyn TargetChain,
    token: Address,
    uris: &[Option<String>],
    start_from: u64,
) -> Result<Vec<TxHandle>> {
    if uris.is_empty() {
        info!(token = %token, "Token URI list is empty, nothing to set");
        return Ok(Vec::new());
    }

    let mut txs = Vec::new();
    for batch in plan_uri_batches(uris, Some(start_from)) {
        log_batch(token, &batch);
        match target
            .token_batch_set_token_uris(token, U256::from(batch.start), &batch.uris)
            .await
        {
            Ok(tx) => txs.push(tx),
            Err(e) => {
                warn!(
                    token = %token,
                    start = batch.start,
                    error = %e,
                    "batchSetTokenURIs failed, setting URIs individually"
                );
                for (j, uri) in batch.uris.iter().enumerate() {
                    let token_id = U256::from(batch.start + j as u64);
                    let tx = target.token_set_token_uri(token, token_id, uri).await?;
                    txs.push(tx);
                }
            }
        }
    }

    Ok(txs)
}

/// (token id, URI) pairs read through `totalSupply` / `tokenByIndex`
pub async fn get_token_uris_via_enumerable(
    source: &dyn SourceChain,
    collection: Address,
) -> Result<Vec<(U256, String)>> {
    let total = source.total_supply(collection).await?;
    let total: u64 = total.saturating_to();

    let mut token_ids = Vec::new();
    for i in 0..total {
        token_ids.push(source.token_by_index(collection, U256::from(i)).await?);
    }

    let mut pairs = Vec::with_capacity(token_ids.len());
    for token_id in token_ids {
        let uri = source.token_uri(collection, token_id).await?;
        pairs.push((token_id, uri));
    }

    info!(collection = %collection, tokens = pairs.len(), "Collected token URIs by index");
    Ok(pairs)
}

/// One bridge-control URI write per (token id, URI) pair
pub async fn set_token_uris_from_pairs(
    target: &dyn TargetChain,
    bridged: Address,
    pairs: &[(U256, String)],
) -> Result<Vec<TxHandle>> {
    let mut txs = Vec::with_capacity(pairs.len());
    for (token_id, uri) in pairs {
        debug!(bridged = %bridged, token_id = %token_id, "Setting token URI");
        let tx = target
            .batch_set_token_uris(bridged, *token_id, std::slice::from_ref(uri))
            .await?;
        txs.push(tx);
    }
    Ok(txs)
}

fn log_batch(contract: Address, batch: &UriBatch) {
    debug!(
        contract = %contract,
        from = batch.start,
        to = batch.end(),
        "Setting token URIs"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSourceChain, FakeTargetChain, TargetWrite};

    const COLLECTION: Address = Address::repeat_byte(0xc0);
    const BRIDGED: Address = Address::repeat_byte(0xb0);

    #[tokio::test]
    async fn test_get_token_uris_keeps_interior_gaps() {
        let source = FakeSourceChain::new();
        source.add_collection(COLLECTION, "A", "A");
        // ids 1..=150 except 40, id 0 missing
        for id in 1..=150u64 {
            if id != 40 {
                source.set_token_uri(COLLECTION, id, &format!("ipfs://x/{}", id));
            }
        }

        let uris = get_token_uris(&source, COLLECTION, true).await.unwrap();
        assert_eq!(uris.len(), 151);
        assert_eq!(uris[0], None);
        assert_eq!(uris[40], None);
        assert_eq!(uris[150].as_deref(), Some("ipfs://x/150"));

        // Two batched reads: [0, 100) then [100, 200)
        assert_eq!(source.uri_batch_starts(), vec![0, 100]);
    }

    #[tokio::test]
    async fn test_get_token_uris_empty_collection() {
        let source = FakeSourceChain::new();
        let uris = get_token_uris(&source, COLLECTION, false).await.unwrap();
        assert!(uris.is_empty());
    }

    #[tokio::test]
    async fn test_set_token_uris_reconstructs_by_index() {
        let target = FakeTargetChain::new();
        let uris: Vec<Option<String>> = (0..10)
            .map(|i| if i == 3 || i == 7 { None } else { Some(format!("u{}", i)) })
            .collect();

        let txs = set_token_uris(&target, BRIDGED, &uris, None).await.unwrap();
        assert_eq!(txs.len(), 3);

        let mut rebuilt: Vec<Option<String>> = vec![None; uris.len()];
        for write in target.writes() {
            if let TargetWrite::BatchSetTokenUris { bridged, start, uris: batch } = write {
                assert_eq!(bridged, BRIDGED);
                let start: usize = start.to();
                assert!(start != 3 && start != 7);
                for (j, uri) in batch.into_iter().enumerate() {
                    rebuilt[start + j] = Some(uri);
                }
            }
        }
        assert_eq!(rebuilt, uris);
    }

    #[tokio::test]
    async fn test_direct_falls_back_to_single_writes() {
        let target = FakeTargetChain::new();
        target.fail_token_batch_uris(true);

        let uris = vec![Some("a".to_string()), Some("b".to_string()), None, Some("d".to_string())];
        let txs = set_token_uris_direct(&target, BRIDGED, &uris, 5).await.unwrap();
        assert_eq!(txs.len(), 3);

        let singles: Vec<(U256, String)> = target
            .writes()
            .into_iter()
            .filter_map(|w| match w {
                TargetWrite::TokenSetTokenUri { token_id, uri, .. } => Some((token_id, uri)),
                _ => None,
            })
            .collect();
        assert_eq!(
            singles,
            vec![
                (U256::from(5), "a".to_string()),
                (U256::from(6), "b".to_string()),
                (U256::from(8), "d".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_uses_batch_when_accepted() {
        let target = FakeTargetChain::new();
        let uris = vec![Some("a".to_string()), Some("b".to_string())];

        let txs = set_token_uris_direct(&target, BRIDGED, &uris, 0).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert!(matches!(
            target.writes().as_slice(),
            [TargetWrite::TokenBatchSetTokenUris { .. }]
        ));
    }

    #[tokio::test]
    async fn test_enumerable_pairs_round_trip() {
        let source = FakeSourceChain::new();
        source.add_collection(COLLECTION, "A", "A");
        source.set_enumerable_tokens(COLLECTION, &[(10, "ipfs://a"), (20, "ipfs://b")]);

        let pairs = get_token_uris_via_enumerable(&source, COLLECTION).await.unwrap();
        assert_eq!(
            pairs,
            vec![
                (U256::from(10), "ipfs://a".to_string()),
                (U256::from(20), "ipfs://b".to_string()),
            ]
        );

        let target = FakeTargetChain::new();
        let txs = set_token_uris_from_pairs(&target, BRIDGED, &pairs).await.unwrap();
        assert_eq!(txs.len(), 2);
    }
}
