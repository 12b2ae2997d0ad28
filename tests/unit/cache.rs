use crate::fixtures::constants::TEST_ADDRESS;
use crate::fixtures::factories::scenario_utxos;
use kaspa_utxo_manager::foundation::Network;
use kaspa_utxo_manager::infrastructure::UtxoCache;
use std::thread::sleep;
use std::time::Duration;

const NET: Network = Network::Testnet;

#[test]
fn test_cache_set_then_get_within_ttl_returns_stored_list() {
    let cache = UtxoCache::new(60_000);
    let utxos = scenario_utxos(&[(100, 10), (200, 20)]);
    cache.set(TEST_ADDRESS, NET, utxos.clone());

    let hit = cache.get(TEST_ADDRESS, NET).expect("cache hit");
    assert_eq!(hit, utxos);
    assert!(cache.has(TEST_ADDRESS, NET));
    assert_eq!(cache.size(), 1);
}

#[test]
fn test_cache_keys_are_scoped_by_network() {
    let cache = UtxoCache::new(60_000);
    cache.set(TEST_ADDRESS, Network::Mainnet, scenario_utxos(&[(100, 10)]));
    assert!(cache.get(TEST_ADDRESS, Network::Testnet).is_none());
    assert!(cache.get(TEST_ADDRESS, Network::Mainnet).is_some());
}

#[test]
fn test_cache_invalidate_then_get_returns_none() {
    let cache = UtxoCache::new(60_000);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    cache.invalidate(TEST_ADDRESS, NET);
    assert!(cache.get(TEST_ADDRESS, NET).is_none());
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_cache_get_past_ttl_removes_entry() {
    let cache = UtxoCache::new(1);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    sleep(Duration::from_millis(5));

    assert!(cache.get(TEST_ADDRESS, NET).is_none());
    // The expired read removed the entry, not just hid it.
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_cache_has_triggers_same_expiry_side_effect_as_get() {
    let cache = UtxoCache::new(1);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    sleep(Duration::from_millis(5));

    assert!(!cache.has(TEST_ADDRESS, NET));
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_cache_cleanup_removes_only_expired_entries_and_counts_them() {
    let cache = UtxoCache::new(1);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    cache.set("kaspa:other", NET, scenario_utxos(&[(200, 10)]));
    sleep(Duration::from_millis(5));

    assert_eq!(cache.cleanup(), 2);
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.cleanup(), 0);
}

#[test]
fn test_cache_clear_empties_everything() {
    let cache = UtxoCache::new(60_000);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    cache.set("kaspa:other", NET, scenario_utxos(&[(200, 10)]));
    cache.clear();
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_cache_stats_report_size_and_expired_counts() {
    let cache = UtxoCache::new(1);
    cache.set(TEST_ADDRESS, NET, scenario_utxos(&[(100, 10)]));
    sleep(Duration::from_millis(5));

    let stats = cache.stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.expired, 1);
}
