use kaspa_utxo_manager::application::{LockReason, UtxoLockTable};
use std::thread::sleep;
use std::time::Duration;

const KEY: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa:0";

#[test]
fn test_lock_then_is_locked_true() {
    let table = UtxoLockTable::new();
    assert!(table.lock(KEY, 60_000, LockReason::Payment));
    assert!(table.is_locked(KEY));
    assert_eq!(table.active_count(), 1);
}

#[test]
fn test_lock_when_already_held_then_rejected() {
    let table = UtxoLockTable::new();
    assert!(table.lock(KEY, 60_000, LockReason::Payment));
    assert!(!table.lock(KEY, 60_000, LockReason::Consolidation));
}

#[test]
fn test_is_locked_past_ttl_auto_releases() {
    let table = UtxoLockTable::new();
    assert!(table.lock(KEY, 1, LockReason::Payment));
    sleep(Duration::from_millis(5));

    assert!(!table.is_locked(KEY));
    // The expired read removed the entry; a fresh lock succeeds.
    assert!(table.lock(KEY, 60_000, LockReason::Payment));
}

#[test]
fn test_unlock_is_idempotent() {
    let table = UtxoLockTable::new();
    table.lock(KEY, 60_000, LockReason::Payment);
    table.unlock(KEY);
    assert!(!table.is_locked(KEY));
    table.unlock(KEY);
    assert!(!table.is_locked(KEY));
}

#[test]
fn test_unlock_many_releases_each_key() {
    let table = UtxoLockTable::new();
    let keys: Vec<String> = (0..3).map(|i| format!("{}:{}", "bb".repeat(32), i)).collect();
    for key in &keys {
        table.lock(key, 60_000, LockReason::Payment);
    }
    table.unlock_many(&keys);
    assert_eq!(table.active_count(), 0);
}

#[test]
fn test_cleanup_expired_sweeps_and_counts() {
    let table = UtxoLockTable::new();
    table.lock(KEY, 1, LockReason::Payment);
    table.lock("cc:1", 60_000, LockReason::Payment);
    sleep(Duration::from_millis(5));

    assert_eq!(table.cleanup_expired(), 1);
    assert_eq!(table.active_count(), 1);
}

#[test]
fn test_expired_lock_can_be_relocked() {
    let table = UtxoLockTable::new();
    table.lock(KEY, 1, LockReason::Consolidation);
    sleep(Duration::from_millis(5));
    assert!(table.lock(KEY, 60_000, LockReason::Payment));
}
