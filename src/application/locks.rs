use crate::foundation::util::time::unix_now_ms;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    Payment,
    Consolidation,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::Payment => write!(f, "payment"),
            LockReason::Consolidation => write!(f, "consolidation"),
        }
    }
}

/// Advisory hold on one outpoint while a transaction is in flight.
#[derive(Clone, Debug, Serialize)]
pub struct UtxoLock {
    pub outpoint_key: String,
    pub locked_at_ms: u64,
    pub expires_at_ms: u64,
    pub reason: LockReason,
}

/// Process-wide advisory lock table keyed by `"{tx_id}:{index}"`. The
/// chain is the true source of truth; this table only keeps two
/// concurrent payments in the same process off the same inputs.
pub struct UtxoLockTable {
    locks: Mutex<HashMap<String, UtxoLock>>,
}

impl UtxoLockTable {
    pub fn new() -> Self {
        Self { locks: Mutex::new(HashMap::new()) }
    }

    fn lock_table(&self) -> MutexGuard<'_, HashMap<String, UtxoLock>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Acquires an advisory lock. Returns `false` when an unexpired lock
    /// already holds the outpoint.
    pub fn lock(&self, outpoint_key: &str, ttl_ms: u64, reason: LockReason) -> bool {
        let now = unix_now_ms();
        let mut table = self.lock_table();
        if let Some(existing) = table.get(outpoint_key) {
            if now <= existing.expires_at_ms {
                return false;
            }
        }
        table.insert(
            outpoint_key.to_string(),
            UtxoLock {
                outpoint_key: outpoint_key.to_string(),
                locked_at_ms: now,
                expires_at_ms: now.saturating_add(ttl_ms),
                reason,
            },
        );
        debug!("utxo locked key={} reason={} ttl_ms={}", outpoint_key, reason, ttl_ms);
        true
    }

    /// Idempotent release.
    pub fn unlock(&self, outpoint_key: &str) {
        self.lock_table().remove(outpoint_key);
    }

    pub fn unlock_many(&self, outpoint_keys: &[String]) {
        let mut table = self.lock_table();
        for key in outpoint_keys {
            table.remove(key);
        }
    }

    /// Auto-expires a stale lock on read.
    pub fn is_locked(&self, outpoint_key: &str) -> bool {
        let now = unix_now_ms();
        let mut table = self.lock_table();
        match table.get(outpoint_key) {
            Some(lock) if now <= lock.expires_at_ms => true,
            Some(_) => {
                table.remove(outpoint_key);
                false
            }
            None => false,
        }
    }

    /// Explicit sweep run at payment entry. Returns removed count.
    pub fn cleanup_expired(&self) -> u32 {
        let now = unix_now_ms();
        let mut table = self.lock_table();
        let before = table.len();
        table.retain(|_, lock| now <= lock.expires_at_ms);
        (before - table.len()) as u32
    }

    pub fn active_count(&self) -> u32 {
        let now = unix_now_ms();
        self.lock_table().values().filter(|l| now <= l.expires_at_ms).count() as u32
    }
}

impl Default for UtxoLockTable {
    fn default() -> Self {
        Self::new()
    }
}
