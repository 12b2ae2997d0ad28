use crate::fixtures::constants::TEST_ADDRESS;
use crate::fixtures::factories::raw_utxo;
use crate::fixtures::mocks::MockChainRpc;
use kaspa_utxo_manager::domain::{RawOutpoint, RawUtxo};
use kaspa_utxo_manager::foundation::{Network, UtxoError};
use kaspa_utxo_manager::infrastructure::{UtxoCache, UtxoFetcher};
use std::sync::Arc;

const NET: Network = Network::Testnet;

fn fetcher_over(rpc: Arc<MockChainRpc>, min_age: u64) -> Arc<UtxoFetcher> {
    let cache = Arc::new(UtxoCache::new(60_000));
    Arc::new(UtxoFetcher::new(rpc, cache, min_age))
}

#[tokio::test]
async fn test_fetch_enriches_with_age_and_freshness() {
    let rpc = Arc::new(MockChainRpc::new(
        vec![raw_utxo(&"01".repeat(32), 0, 100, 990), raw_utxo(&"02".repeat(32), 1, 200, 1_000)],
        1_000,
    ));
    let fetcher = fetcher_over(rpc, 5);

    let utxos = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    assert_eq!(utxos.len(), 2);

    assert_eq!(utxos[0].metadata.age_in_blocks, 10);
    assert!(!utxos[0].metadata.is_fresh);
    assert_eq!(utxos[1].metadata.age_in_blocks, 0);
    assert!(utxos[1].metadata.is_fresh);
    for utxo in &utxos {
        assert_eq!(utxo.metadata.estimated_mass_contribution, 200);
        assert!(utxo.metadata.fetched_at_ms > 0);
    }
}

#[tokio::test]
async fn test_fetch_drops_malformed_entries() {
    let malformed = RawUtxo {
        address: None,
        outpoint: Some(RawOutpoint { transaction_id: None, index: Some(0) }),
        utxo_entry: None,
    };
    let rpc = Arc::new(MockChainRpc::new(vec![malformed, raw_utxo(&"03".repeat(32), 0, 100, 900)], 1_000));
    let fetcher = fetcher_over(rpc, 5);

    let utxos = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].amount_sompi, 100);
}

#[tokio::test]
async fn test_fetch_serves_second_call_from_cache() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"04".repeat(32), 0, 100, 900)], 1_000));
    let fetcher = fetcher_over(rpc.clone(), 5);

    let first = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    let second = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    assert_eq!(first, second);
    assert_eq!(rpc.utxo_calls(), 1);
}

#[tokio::test]
async fn test_fetch_with_force_refresh_bypasses_cache() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"05".repeat(32), 0, 100, 900)], 1_000));
    let fetcher = fetcher_over(rpc.clone(), 5);

    fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    fetcher.fetch(TEST_ADDRESS, NET, true).await.expect("fetch");
    assert_eq!(rpc.utxo_calls(), 2);
}

#[tokio::test]
async fn test_fetch_invalidate_forces_refetch() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"06".repeat(32), 0, 100, 900)], 1_000));
    let fetcher = fetcher_over(rpc.clone(), 5);

    fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    fetcher.invalidate(TEST_ADDRESS, NET);
    fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    assert_eq!(rpc.utxo_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_retries_transient_listing_failures() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"07".repeat(32), 0, 100, 900)], 1_000));
    rpc.fail_next_utxo_calls(2);
    let fetcher = fetcher_over(rpc.clone(), 5);

    let utxos = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch after retries");
    assert_eq!(utxos.len(), 1);
    assert_eq!(rpc.utxo_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_when_retries_exhausted_then_fetch_failed_error() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"08".repeat(32), 0, 100, 900)], 1_000));
    rpc.fail_next_utxo_calls(5);
    let fetcher = fetcher_over(rpc.clone(), 5);

    let err = fetcher.fetch(TEST_ADDRESS, NET, false).await.unwrap_err();
    match err {
        UtxoError::FetchFailed { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("scripted listing failure"));
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }
    assert_eq!(rpc.utxo_calls(), 3);
}

#[tokio::test]
async fn test_daa_score_failure_degrades_to_zero_and_everything_fresh() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"09".repeat(32), 0, 100, 900)], 1_000));
    rpc.set_daa_score_fails(true);
    let fetcher = fetcher_over(rpc.clone(), 5);

    assert_eq!(fetcher.current_virtual_score(NET).await, 0);

    let utxos = fetcher.fetch(TEST_ADDRESS, NET, false).await.expect("fetch");
    // Age clamps to 0 against a zero virtual score: conservatively fresh.
    assert!(utxos.iter().all(|u| u.metadata.age_in_blocks == 0 && u.metadata.is_fresh));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_coalesce_into_single_upstream_request() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"0a".repeat(32), 0, 100, 900)], 1_000));
    rpc.set_utxo_delay_ms(50);
    let fetcher = fetcher_over(rpc.clone(), 5);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let fetcher = fetcher.clone();
        handles.push(tokio::spawn(async move { fetcher.fetch(TEST_ADDRESS, NET, false).await }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("join").expect("fetch"));
    }

    assert_eq!(rpc.utxo_calls(), 1, "single-flight must issue exactly one upstream request");
    for window in results.windows(2) {
        assert_eq!(window[0], window[1]);
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_flight_propagates_failure_to_every_caller() {
    let rpc = Arc::new(MockChainRpc::new(vec![raw_utxo(&"0b".repeat(32), 0, 100, 900)], 1_000));
    rpc.set_utxo_delay_ms(50);
    rpc.fail_next_utxo_calls(10);
    let fetcher = fetcher_over(rpc.clone(), 5);

    let mut handles = Vec::new();
    for _ in 0..3 {
        let fetcher = fetcher.clone();
        handles.push(tokio::spawn(async move { fetcher.fetch(TEST_ADDRESS, NET, false).await }));
    }
    for handle in handles {
        let result = handle.await.expect("join");
        assert!(matches!(result, Err(UtxoError::FetchFailed { .. })));
    }
    assert_eq!(rpc.utxo_calls(), 3, "followers must not add upstream attempts beyond the leader's retries");
}
