use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::mpsc;

use super::*;
use crate::chain::{ChainContext, TargetChain};
use crate::error::BridgeError;
use crate::testing::{FakeIndex, FakeSourceChain, FakeTargetChain, TargetWrite};
use crate::types::{AirdropUnit, RoyaltyInfo, TokenStandard};
use crate::validation::ValidationFailure;

const ORIGINAL: Address = Address::repeat_byte(0xc0);
const BRIDGED: Address = Address::repeat_byte(0xbb);
const ALICE: Address = Address::repeat_byte(0x11);
const BOB: Address = Address::repeat_byte(0x22);
const CAROL: Address = Address::repeat_byte(0x33);
const COLLECTION_OWNER: Address = Address::repeat_byte(0x0e);
const ROYALTY_RECIPIENT: Address = Address::repeat_byte(0x0f);

struct Harness {
    source: Arc<FakeSourceChain>,
    target: Arc<FakeTargetChain>,
    index: Arc<FakeIndex>,
}

impl Harness {
    fn new() -> Self {
        Self {
            source: Arc::new(FakeSourceChain::new()),
            target: Arc::new(FakeTargetChain::new()),
            index: Arc::new(FakeIndex::new()),
        }
    }

    fn bridge(&self) -> NftBridge {
        NftBridge::new(
            self.source.clone(),
            self.target.clone(),
            self.index.clone(),
            BridgeSettings::default(),
        )
        .unwrap()
    }

    /// Verified ERC-721 collection with a `{base}{id}.json` template,
    /// approved for bridging
    fn templated_721(&self) {
        self.source.add_collection(ORIGINAL, "Sonic Punks", "SPUNK");
        self.source.set_token_uri(ORIGINAL, 1, "ipfs://QmBase/1.json");
        self.source.set_owner(ORIGINAL, COLLECTION_OWNER);
        self.source.set_royalty_info(
            ORIGINAL,
            ROYALTY_RECIPIENT,
            U256::from(50_000_000_000_000_000u128),
        );
        self.index.set_stats(ORIGINAL, true, 3, 2);
        self.index
            .add_721_holders(ORIGINAL, &[(ALICE, 1), (BOB, 2), (ALICE, 3)]);
        self.target.approve(ORIGINAL);
    }

    /// Verified ERC-1155 collection with per-token URIs and only a registry royalty
    fn per_token_1155(&self) {
        self.source.add_collection(ORIGINAL, "Sonic Items", "ITEM");
        self.source.set_erc1155(ORIGINAL, true);
        self.source.set_token_uri(ORIGINAL, 1, "ipfs://QmA");
        self.source.set_token_uri(ORIGINAL, 2, "ipfs://QmB");
        self.source.set_token_uri(ORIGINAL, 3, "ipfs://QmC");
        self.source.set_registry_royalty(
            ORIGINAL,
            RoyaltyInfo {
                recipient: ROYALTY_RECIPIENT,
                fee: U256::from(250),
            },
        );
        self.index.set_stats(ORIGINAL, true, 3, 2);
        self.index.add_record(ORIGINAL, ALICE, 1, 5, false);
        self.index.add_record(ORIGINAL, BOB, 2, 1, false);
        self.index.add_record(ORIGINAL, ALICE, 3, 2, false);
        self.target.approve(ORIGINAL);
    }
}

fn overridden() -> BridgeOptions {
    BridgeOptions {
        override_requirements: true,
        ..Default::default()
    }
}

#[test]
fn test_rejects_swapped_bindings() {
    let h = Harness::new();
    let source = Arc::new(FakeSourceChain::with_context(ChainContext::target(146, "memory://x")));

    let err = NftBridge::new(source, h.target.clone(), h.index.clone(), BridgeSettings::default())
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::ChainBindingMismatch {
            capability: "source",
            ..
        })
    ));

    let target = Arc::new(FakeTargetChain::with_context(ChainContext::source(250, "memory://y")));
    let err = NftBridge::new(h.source.clone(), target, h.index.clone(), BridgeSettings::default())
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::ChainBindingMismatch {
            capability: "target",
            ..
        })
    ));
}

// ============================================================================
// bridge
// ============================================================================

#[tokio::test]
async fn test_bridge_721_with_uri_template() {
    let h = Harness::new();
    h.templated_721();

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();
    let report = outcome.complete().unwrap();

    let bridged = h.target.bridged_for(ORIGINAL).unwrap();
    assert_eq!(report.original_address, ORIGINAL);
    assert_eq!(report.bridged_address, bridged);
    assert_eq!(report.standard, TokenStandard::Erc721);
    assert_eq!(report.owner, COLLECTION_OWNER);
    assert_eq!(report.royalty.fee, U256::from(500));
    assert_eq!(report.holders, 2);
    assert_eq!(report.airdrop_txs.len(), 1);
    assert!(report.uri_txs.is_none());

    let writes = h.target.writes();
    assert_eq!(writes.len(), 2);
    match &writes[0] {
        TargetWrite::DeployErc721(d) => {
            assert_eq!(d.original, ORIGINAL);
            assert_eq!(d.name, "Sonic Punks");
            assert_eq!(d.symbol, "SPUNK");
            assert_eq!(d.base_uri, "ipfs://QmBase/");
            assert_eq!(d.extension, ".json");
            assert_eq!(d.royalty.recipient, ROYALTY_RECIPIENT);
            assert!(!d.enumerable);
        }
        other => panic!("unexpected write {:?}", other),
    }
    match &writes[1] {
        TargetWrite::Airdrop721 { bridged: b, units } => {
            assert_eq!(*b, bridged);
            assert_eq!(units[0].address, ALICE);
            assert_eq!(units[0].token_ids, vec![U256::from(1), U256::from(3)]);
            assert_eq!(units[1].address, BOB);
        }
        other => panic!("unexpected write {:?}", other),
    }
}

#[tokio::test]
async fn test_bridge_1155_backfills_uris() {
    let h = Harness::new();
    h.per_token_1155();

    let report = h
        .bridge()
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.standard, TokenStandard::Erc1155);
    assert_eq!(report.royalty.fee, U256::from(250));
    assert_eq!(report.uri_txs.as_ref().map(Vec::len), Some(1));

    let writes = h.target.writes();
    assert!(matches!(&writes[0], TargetWrite::DeployErc1155(d) if d.name == "Sonic Items"));
    match &writes[1] {
        TargetWrite::Airdrop1155 { units, .. } => {
            assert_eq!(units[0].amounts, vec![U256::from(5), U256::from(2)]);
        }
        other => panic!("unexpected write {:?}", other),
    }
    match &writes[2] {
        TargetWrite::BatchSetTokenUris { start, uris, .. } => {
            assert_eq!(*start, U256::from(1));
            assert_eq!(uris, &["ipfs://QmA", "ipfs://QmB", "ipfs://QmC"]);
        }
        other => panic!("unexpected write {:?}", other),
    }
}

#[tokio::test]
async fn test_bridge_721_without_template_backfills_uris() {
    let h = Harness::new();
    h.templated_721();
    h.source.set_token_uri(ORIGINAL, 1, "ar://opaque-one");
    h.source.set_token_uri(ORIGINAL, 2, "ar://opaque-two");

    let report = h
        .bridge()
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert!(report.uri_txs.is_some());
    assert!(matches!(
        h.target.writes().last(),
        Some(TargetWrite::BatchSetTokenUris { .. })
    ));
}

#[tokio::test]
async fn test_too_many_nfts_rejected_without_writes() {
    let h = Harness::new();
    h.templated_721();
    h.index.set_stats(ORIGINAL, true, 12_500, 10);

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();

    match &outcome {
        Outcome::ValidationFailed { failure, .. } => {
            assert!(matches!(failure, ValidationFailure::TooManyNfts { total: 12_500, .. }));
            assert!(failure.to_string().contains("too many NFTs"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(h.target.writes().is_empty());
    assert!(h.index.requested_offsets().is_empty());
}

#[tokio::test]
async fn test_unverified_rejected() {
    let h = Harness::new();
    h.templated_721();
    h.index.set_stats(ORIGINAL, false, 3, 2);

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();
    assert!(matches!(
        outcome,
        Outcome::ValidationFailed {
            failure: ValidationFailure::NotVerified,
            ..
        }
    ));
}

#[tokio::test]
async fn test_override_skips_validation() {
    let h = Harness::new();
    h.templated_721();
    h.index.set_stats(ORIGINAL, false, 12_500, 12_000);

    let outcome = h.bridge().bridge(ORIGINAL, &overridden()).await.unwrap();
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_owner_override() {
    let h = Harness::new();
    h.templated_721();

    let options = BridgeOptions {
        owner_override: Some(CAROL),
        ..Default::default()
    };
    let report = h.bridge().bridge(ORIGINAL, &options).await.unwrap().complete().unwrap();

    assert_eq!(report.owner, CAROL);
    assert!(matches!(&h.target.writes()[0], TargetWrite::DeployErc721(d) if d.owner == CAROL));
}

#[tokio::test]
async fn test_bridged_address_input_reports_already_bridged() {
    let h = Harness::new();
    h.templated_721();
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let outcome = h.bridge().bridge(BRIDGED, &BridgeOptions::default()).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::AlreadyBridged {
            original_address: ORIGINAL,
            bridged_address: BRIDGED,
        }
    );
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_original_with_counterpart_reports_already_bridged() {
    let h = Harness::new();
    h.templated_721();
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();
    assert_eq!(outcome.status(), "already_bridged");
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_not_approved() {
    let h = Harness::new();
    h.templated_721();
    h.target.set_bridging_approved(ORIGINAL, false).await.unwrap();

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::NotApproved {
            original_address: ORIGINAL
        }
    );
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_deploy_without_registration_fails() {
    let h = Harness::new();
    h.templated_721();
    h.target.skip_registration(true);

    let outcome = h.bridge().bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();

    assert!(matches!(outcome, Outcome::DeployFailed { .. }));
    let writes = h.target.writes();
    assert_eq!(writes.len(), 1);
    assert!(matches!(writes[0], TargetWrite::DeployErc721(_)));
}

#[tokio::test]
async fn test_no_holders_is_fatal() {
    let h = Harness::new();
    h.source.add_collection(ORIGINAL, "Empty", "NONE");
    h.index.set_stats(ORIGINAL, true, 0, 0);
    h.target.approve(ORIGINAL);

    let err = h
        .bridge()
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::NoHolders(a)) if *a == ORIGINAL
    ));
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_malformed_index_aborts_bridge() {
    let h = Harness::new();
    h.templated_721();
    h.index.set_malformed(true);

    let err = h
        .bridge()
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::MalformedIndexResponse { .. })
    ));
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_royalty_unavailable_aborts_before_deploy() {
    let h = Harness::new();
    let other = Address::repeat_byte(0xc1);
    h.source.add_collection(other, "No Royalty", "NR");
    h.index.set_stats(other, true, 1, 1);
    h.index.add_record(other, ALICE, 1, 1, true);
    h.target.approve(other);

    let err = h
        .bridge()
        .bridge(other, &BridgeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::RoyaltyUnavailable { .. })
    ));
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_concurrent_operation_fails_fast() {
    let h = Harness::new();
    h.templated_721();
    let bridge = h.bridge();

    let _held = bridge.locks().acquire(ORIGINAL).unwrap();
    let err = bridge
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::OperationInProgress(a)) if *a == ORIGINAL
    ));
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_lock_released_after_flow() {
    let h = Harness::new();
    h.templated_721();
    let bridge = h.bridge();

    bridge.bridge(ORIGINAL, &BridgeOptions::default()).await.unwrap();
    assert!(!bridge.locks().is_locked(&ORIGINAL));
}

#[tokio::test]
async fn test_bridge_halts_on_incomplete_index_stats() {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::index::PaintswapIndex;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v2/collections/{}", ORIGINAL)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "collection": { "verified": true } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/userNFTs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nfts": [{ "user": ALICE, "tokenId": "1", "amount": "1", "isERC721": true }]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let h = Harness::new();
    h.source.add_collection(ORIGINAL, "Sonic Punks", "SPUNK");
    h.target.approve(ORIGINAL);
    let index = PaintswapIndex::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let bridge = NftBridge::new(
        h.source.clone(),
        h.target.clone(),
        Arc::new(index),
        BridgeSettings::default(),
    )
    .unwrap();

    let err = bridge
        .bridge(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::MalformedIndexResponse { field: "stats", .. })
    ));
    assert!(h.target.writes().is_empty());
}

// ============================================================================
// remint / reclaim / rebridge
// ============================================================================

#[tokio::test]
async fn test_remint_requires_bridge() {
    let h = Harness::new();
    h.templated_721();

    let outcome = h.bridge().remint(ORIGINAL, &BridgeOptions::default()).await.unwrap();
    assert_eq!(outcome.status(), "not_bridged");
}

#[tokio::test]
async fn test_remint_1155_replays_holders_and_uris() {
    let h = Harness::new();
    h.per_token_1155();
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let report = h
        .bridge()
        .remint(BRIDGED, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.bridged_address, BRIDGED);
    assert_eq!(report.holders, 2);
    assert_eq!(report.airdrop_txs.len(), 1);
    assert_eq!(report.uri_txs.map(|t| t.len()), Some(1));
    assert!(!h
        .target
        .writes()
        .iter()
        .any(|w| matches!(w, TargetWrite::DeployErc721(_) | TargetWrite::DeployErc1155(_))));
}

#[tokio::test]
async fn test_reclaim_packs_721_ids_for_admin() {
    let h = Harness::new();
    h.target.register_bridged(ORIGINAL, BRIDGED);
    h.index.set_stats(ORIGINAL, true, 41, 3);
    let holdings: Vec<(Address, u64)> = (0..41u64)
        .map(|id| (if id < 10 { ALICE } else if id < 40 { BOB } else { CAROL }, id))
        .collect();
    h.index.add_721_holders(ORIGINAL, &holdings);

    let report = h
        .bridge()
        .reclaim(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.admin, FakeTargetChain::OPERATOR);
    assert_eq!(report.standard, Some(TokenStandard::Erc721));
    assert_eq!(report.airdrop_txs.len(), 2);

    let sizes: Vec<usize> = h
        .target
        .writes()
        .iter()
        .map(|w| match w {
            TargetWrite::Airdrop721 { bridged, units } => {
                assert_eq!(*bridged, BRIDGED);
                assert!(units.iter().all(|u| u.address == FakeTargetChain::OPERATOR));
                units.iter().map(AirdropUnit::token_count).sum()
            }
            other => panic!("unexpected write {:?}", other),
        })
        .collect();
    assert_eq!(sizes, vec![25, 16]);
}

#[tokio::test]
async fn test_reclaim_1155_chunks_by_airdrop_budget() {
    let h = Harness::new();
    h.target.register_bridged(ORIGINAL, BRIDGED);
    h.index.set_stats(ORIGINAL, true, 40, 2);
    for id in 0..40u64 {
        h.index
            .add_record(ORIGINAL, if id < 20 { ALICE } else { BOB }, id, 1, false);
    }

    let report = h
        .bridge()
        .reclaim(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.standard, Some(TokenStandard::Erc1155));
    // Two 20-id units fit one 50-id airdrop but not two 25-id reclaim chunks
    assert_eq!(report.airdrop_txs.len(), 1);
    let writes = h.target.writes();
    assert_eq!(writes.len(), 1);
    match &writes[0] {
        TargetWrite::Airdrop1155 { bridged, units } => {
            assert_eq!(*bridged, BRIDGED);
            assert_eq!(units.len(), 2);
            assert!(units.iter().all(|u| u.address == FakeTargetChain::OPERATOR && !u.is721));
            assert_eq!(units.iter().map(AirdropUnit::token_count).sum::<usize>(), 40);
        }
        other => panic!("unexpected write {:?}", other),
    }
}

#[tokio::test]
async fn test_reclaim_without_holders_completes_empty() {
    let h = Harness::new();
    h.target.register_bridged(ORIGINAL, BRIDGED);
    h.index.set_stats(ORIGINAL, true, 0, 0);

    let report = h
        .bridge()
        .reclaim(ORIGINAL, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert!(report.standard.is_none());
    assert!(report.airdrop_txs.is_empty());
    assert!(h.target.writes().is_empty());
}

#[tokio::test]
async fn test_rebridge_reports_four_steps() {
    let h = Harness::new();
    h.templated_721();
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let bridge = h.bridge().with_progress(tx);

    let report = bridge
        .rebridge(BRIDGED, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    let mut steps = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        assert_eq!(progress.total, 4);
        steps.push(progress.step);
    }
    assert_eq!(steps, vec![1, 2, 3, 4]);

    assert_eq!(report.previous_bridged_address, BRIDGED);
    assert_ne!(report.bridged_address, BRIDGED);
    assert_eq!(Some(report.bridged_address), h.target.bridged_for(ORIGINAL));

    let writes = h.target.writes();
    assert!(matches!(&writes[0], TargetWrite::Airdrop721 { bridged, .. } if *bridged == BRIDGED));
    assert!(matches!(&writes[1], TargetWrite::ClearBridgedStorage { original } if *original == ORIGINAL));
    assert!(matches!(&writes[2], TargetWrite::DeployErc721(_)));
    assert!(
        matches!(&writes[3], TargetWrite::Airdrop721 { bridged, .. } if *bridged == report.bridged_address)
    );
}

#[tokio::test]
async fn test_rebridge_without_holders_probes_standard() {
    let h = Harness::new();
    let empty = Address::repeat_byte(0xc2);
    h.source.add_collection(empty, "Burned", "BRN");
    h.source.set_erc1155(empty, true);
    h.source.set_registry_royalty(
        empty,
        RoyaltyInfo {
            recipient: ROYALTY_RECIPIENT,
            fee: U256::from(100),
        },
    );
    h.index.set_stats(empty, true, 0, 0);
    h.target.register_bridged(empty, BRIDGED);

    let report = h
        .bridge()
        .rebridge(empty, &BridgeOptions::default())
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.standard, TokenStandard::Erc1155);
    assert!(report.reclaim_txs.is_empty());
    assert!(report.airdrop_txs.is_empty());
    assert!(h
        .target
        .writes()
        .iter()
        .any(|w| matches!(w, TargetWrite::DeployErc1155(d) if d.original == empty)));
}

// ============================================================================
// approve / clear / set URIs / ownership / resolve
// ============================================================================

#[tokio::test]
async fn test_approve_toggles_registry() {
    let h = Harness::new();
    let bridge = h.bridge();

    bridge.approve(ORIGINAL, true).await.unwrap();
    assert!(h.target.bridging_approved(ORIGINAL).await.unwrap());

    bridge.approve(ORIGINAL, false).await.unwrap();
    assert!(!h.target.bridging_approved(ORIGINAL).await.unwrap());
    assert_eq!(h.target.writes().len(), 2);
}

#[tokio::test]
async fn test_clear_removes_pair() {
    let h = Harness::new();
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let report = h.bridge().clear(BRIDGED).await.unwrap().complete().unwrap();

    assert_eq!(report.original_address, ORIGINAL);
    assert_eq!(report.bridged_address, BRIDGED);
    assert!(h.target.bridged_for(ORIGINAL).is_none());

    let outcome = h.bridge().clear(ORIGINAL).await.unwrap();
    assert_eq!(outcome.status(), "not_bridged");
}

fn five_uris(h: &Harness) {
    h.source.add_collection(ORIGINAL, "Sonic Punks", "SPUNK");
    for id in 0..5u64 {
        h.source
            .set_token_uri(ORIGINAL, id, &format!("ar://token-{}", id));
    }
    h.target.register_bridged(ORIGINAL, BRIDGED);
}

#[tokio::test]
async fn test_set_uris_bridge_mode_from_start_index() {
    let h = Harness::new();
    five_uris(&h);

    let report = h
        .bridge()
        .set_uris(ORIGINAL, 2, SetUrisMode::Bridge)
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.mode, "bridge");
    assert_eq!(report.uri_txs.len(), 1);
    match &h.target.writes()[0] {
        TargetWrite::BatchSetTokenUris { bridged, start, uris } => {
            assert_eq!(*bridged, BRIDGED);
            assert_eq!(*start, U256::from(2));
            assert_eq!(uris, &["ar://token-2", "ar://token-3", "ar://token-4"]);
        }
        other => panic!("unexpected write {:?}", other),
    }
}

#[tokio::test]
async fn test_set_uris_direct_falls_back_per_token() {
    let h = Harness::new();
    five_uris(&h);
    h.target.fail_token_batch_uris(true);

    let report = h
        .bridge()
        .set_uris(ORIGINAL, 3, SetUrisMode::Direct)
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.uri_txs.len(), 2);
    let writes = h.target.writes();
    assert_eq!(
        writes,
        vec![
            TargetWrite::TokenSetTokenUri {
                token: BRIDGED,
                token_id: U256::from(3),
                uri: "ar://token-3".to_string(),
            },
            TargetWrite::TokenSetTokenUri {
                token: BRIDGED,
                token_id: U256::from(4),
                uri: "ar://token-4".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_set_uris_enumerable_filters_by_token_id() {
    let h = Harness::new();
    h.source.add_collection(ORIGINAL, "Sparse", "SPR");
    h.source
        .set_enumerable_tokens(ORIGINAL, &[(5, "ar://five"), (9, "ar://nine"), (12, "ar://twelve")]);
    h.target.register_bridged(ORIGINAL, BRIDGED);

    let report = h
        .bridge()
        .set_uris(ORIGINAL, 9, SetUrisMode::Enumerable)
        .await
        .unwrap()
        .complete()
        .unwrap();

    assert_eq!(report.uri_txs.len(), 2);
    let starts: Vec<U256> = h
        .target
        .writes()
        .iter()
        .filter_map(|w| match w {
            TargetWrite::BatchSetTokenUris { start, .. } => Some(*start),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![U256::from(9), U256::from(12)]);
}

#[tokio::test]
async fn test_set_uris_requires_bridge() {
    let h = Harness::new();
    let outcome = h
        .bridge()
        .set_uris(ORIGINAL, 0, SetUrisMode::Bridge)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::NotBridged {
            original_address: ORIGINAL
        }
    );
}

#[tokio::test]
async fn test_transfer_ownership_requires_operator() {
    let h = Harness::new();
    let bridge = h.bridge();
    h.target.set_token_owner(BRIDGED, CAROL);

    let err = bridge.transfer_ownership(BRIDGED, ALICE).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BridgeError>(),
        Some(BridgeError::NotCurrentOwner { owner, .. }) if *owner == CAROL
    ));
    assert!(h.target.writes().is_empty());

    h.target.set_token_owner(BRIDGED, FakeTargetChain::OPERATOR);
    bridge.transfer_ownership(BRIDGED, ALICE).await.unwrap();
    assert_eq!(h.target.token_owner(BRIDGED).await.unwrap(), ALICE);
}

#[tokio::test]
async fn test_resolve_both_sides() {
    let h = Harness::new();
    h.target.register_bridged(ORIGINAL, BRIDGED);
    let bridge = h.bridge();

    let from_original = bridge.resolve(ORIGINAL).await.unwrap().unwrap();
    assert_eq!(from_original.bridged_address, Some(BRIDGED));
    assert!(!from_original.input_is_bridged);

    let from_bridged = bridge.resolve(BRIDGED).await.unwrap().unwrap();
    assert_eq!(from_bridged.original_address, ORIGINAL);
    assert!(from_bridged.input_is_bridged);

    assert_eq!(
        bridge.resolve_original_address(BRIDGED).await.unwrap(),
        Some(ORIGINAL)
    );
    assert!(bridge.resolve(ALICE).await.unwrap().is_none());
}
