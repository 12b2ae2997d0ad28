use crate::domain::model::{enrich_utxo, EnrichedUtxo};
use crate::foundation::util::time::unix_now_ms;
use crate::foundation::{Network, Result, UtxoError, FETCH_RETRY_ATTEMPTS, FETCH_RETRY_BASE_DELAY_MS};
use crate::infrastructure::cache::UtxoCache;
use crate::infrastructure::rpc::retry::retry_with_backoff;
use crate::infrastructure::rpc::ChainRpc;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// Broadcastable settlement of an in-flight fetch. `broadcast` requires a
/// `Clone` payload, so errors travel as their display text and are
/// rehydrated at the awaiting side.
type FlightResult = std::result::Result<Vec<EnrichedUtxo>, String>;

/// Retrieves raw UTXOs plus the current virtual DAA score, enriches the
/// survivors and keeps the cache warm. Concurrent fetches for the same
/// `(address, network)` are coalesced into a single upstream request.
pub struct UtxoFetcher {
    rpc: Arc<dyn ChainRpc>,
    cache: Arc<UtxoCache>,
    min_utxo_age_blocks: u64,
    inflight: Mutex<HashMap<String, broadcast::Sender<FlightResult>>>,
}

impl UtxoFetcher {
    pub fn new(rpc: Arc<dyn ChainRpc>, cache: Arc<UtxoCache>, min_utxo_age_blocks: u64) -> Self {
        Self { rpc, cache, min_utxo_age_blocks, inflight: Mutex::new(HashMap::new()) }
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<FlightResult>>> {
        self.inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Looks up or registers the in-flight slot for `key`. Kept as a plain
    /// (non-async) function so the `MutexGuard` never lives inside the
    /// `fetch` future across an `.await` point.
    fn join_or_register_inflight(
        &self,
        key: &str,
    ) -> std::result::Result<broadcast::Sender<FlightResult>, broadcast::Receiver<FlightResult>> {
        let mut inflight = self.lock_inflight();
        if let Some(existing) = inflight.get(key) {
            return Err(existing.subscribe());
        }
        let (sender, _receiver) = broadcast::channel(1);
        inflight.insert(key.to_string(), sender.clone());
        Ok(sender)
    }

    /// Cache-first fetch. With `force_refresh` the cache is bypassed (but
    /// still refreshed on success).
    pub async fn fetch(&self, address: &str, network: Network, force_refresh: bool) -> Result<Vec<EnrichedUtxo>> {
        if !force_refresh {
            if let Some(cached) = self.cache.get(address, network) {
                debug!("cache hit address={} network={} count={}", address, network, cached.len());
                return Ok(cached);
            }
        }

        let key = UtxoCache::cache_key(address, network);
        let sender = match self.join_or_register_inflight(&key) {
            Ok(sender) => sender,
            Err(mut receiver) => {
                debug!("joining in-flight fetch key={}", key);
                return match receiver.recv().await {
                    Ok(Ok(utxos)) => Ok(utxos),
                    Ok(Err(message)) => Err(UtxoError::FetchFailed { attempts: FETCH_RETRY_ATTEMPTS, last_error: message }),
                    Err(_) => Err(UtxoError::Message("in-flight fetch channel dropped".to_string())),
                };
            }
        };

        let result = self.fetch_remote(address, network).await;

        // Remove before broadcasting: map-lock serialization means every
        // subscriber attached before this point, and later arrivals start
        // a fresh fetch instead of awaiting a settled one.
        self.lock_inflight().remove(&key);
        let _ = sender.send(match &result {
            Ok(utxos) => Ok(utxos.clone()),
            Err(err) => Err(err.to_string()),
        });
        result
    }

    /// Current virtual DAA score, or 0 when the endpoint fails. A zero
    /// score makes every UTXO look fresh, so selection refuses
    /// conservatively instead of wrongly succeeding.
    pub async fn current_virtual_score(&self, network: Network) -> u64 {
        match self.rpc.virtual_daa_score(network).await {
            Ok(score) => score,
            Err(err) => {
                warn!("virtual daa score fetch failed, substituting 0 error={}", err);
                0
            }
        }
    }

    async fn fetch_remote(&self, address: &str, network: Network) -> Result<Vec<EnrichedUtxo>> {
        let virtual_score = self.current_virtual_score(network).await;

        let raw_utxos = retry_with_backoff(FETCH_RETRY_ATTEMPTS, Duration::from_millis(FETCH_RETRY_BASE_DELAY_MS), || {
            self.rpc.utxos_by_address(address, network)
        })
        .await
        .map_err(|err| UtxoError::fetch_failed(FETCH_RETRY_ATTEMPTS, err.to_string()))?;

        let fetched_at_ms = unix_now_ms();
        let mut enriched = Vec::with_capacity(raw_utxos.len());
        let mut malformed = 0u32;
        for raw in &raw_utxos {
            match enrich_utxo(raw, virtual_score, self.min_utxo_age_blocks, fetched_at_ms) {
                Some(utxo) => enriched.push(utxo),
                None => malformed += 1,
            }
        }
        if malformed > 0 {
            debug!("dropped malformed utxos count={} address={}", malformed, address);
        }

        self.cache.set(address, network, enriched.clone());
        info!(
            "fetched utxos address={} network={} count={} virtual_daa_score={}",
            address,
            network,
            enriched.len(),
            virtual_score
        );
        Ok(enriched)
    }

    pub fn invalidate(&self, address: &str, network: Network) {
        self.cache.invalidate(address, network);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &UtxoCache {
        &self.cache
    }
}
