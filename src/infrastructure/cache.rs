use crate::domain::model::EnrichedUtxo;
use crate::foundation::util::time::unix_now_ms;
use crate::foundation::Network;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One cached per-address listing. Lifecycle: created by `set`, removed on
/// expiry at read time, `invalidate`, `clear` or `cleanup`.
#[derive(Clone, Debug)]
struct CacheEntry {
    utxos: Vec<EnrichedUtxo>,
    expires_at_ms: u64,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct CacheStats {
    pub size: u32,
    pub expired: u32,
}

/// TTL-scoped mapping `(address, network) -> enriched UTXO list`. Never
/// fails; a miss and an expired entry are the same `None`.
pub struct UtxoCache {
    ttl_ms: u64,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl UtxoCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self { ttl_ms, entries: Mutex::new(HashMap::new()) }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // The map carries no cross-entry invariants; a poisoned guard is
        // still a valid map.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn cache_key(address: &str, network: Network) -> String {
        format!("{}:{}", network, address)
    }

    /// Returns the cached listing, removing it first if the TTL elapsed.
    pub fn get(&self, address: &str, network: Network) -> Option<Vec<EnrichedUtxo>> {
        let key = Self::cache_key(address, network);
        let mut entries = self.lock_entries();
        match entries.get(&key) {
            Some(entry) if unix_now_ms() <= entry.expires_at_ms => Some(entry.utxos.clone()),
            Some(_) => {
                entries.remove(&key);
                debug!("cache entry expired key={}", key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, address: &str, network: Network, utxos: Vec<EnrichedUtxo>) {
        let key = Self::cache_key(address, network);
        let entry = CacheEntry { utxos, expires_at_ms: unix_now_ms().saturating_add(self.ttl_ms) };
        self.lock_entries().insert(key, entry);
    }

    pub fn invalidate(&self, address: &str, network: Network) {
        self.lock_entries().remove(&Self::cache_key(address, network));
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Sweeps every expired entry, returning how many were removed.
    pub fn cleanup(&self) -> u32 {
        let now = unix_now_ms();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at_ms);
        (before - entries.len()) as u32
    }

    /// `get(...) != None`, including the expiry side effect.
    pub fn has(&self, address: &str, network: Network) -> bool {
        self.get(address, network).is_some()
    }

    pub fn size(&self) -> u32 {
        self.lock_entries().len() as u32
    }

    pub fn stats(&self) -> CacheStats {
        let now = unix_now_ms();
        let entries = self.lock_entries();
        let expired = entries.values().filter(|e| now > e.expires_at_ms).count() as u32;
        CacheStats { size: entries.len() as u32, expired }
    }
}
