use crate::application::consolidator::Consolidator;
use crate::application::locks::{LockReason, UtxoLockTable};
use crate::application::submit::{
    classify_submit_error, extract_transaction_id, mass_error_suggestions, SubmitErrorKind, TransactionBuilder,
};
use crate::domain::mass::MassEstimator;
use crate::domain::model::{ConsolidationRecommendation, ConsolidationResult, SelectedUtxos, WalletHealth};
use crate::domain::selector::UtxoSelector;
use crate::foundation::{
    Network, Result, UtxoError, MATURITY_POLL_INTERVAL_MS, NETWORK_RETRY_DELAY_MS, ORPHAN_RETRY_DELAY_MS,
    PAYMENT_LOCK_TTL_MS, PAYMENT_MASS_HEADROOM,
};
use crate::infrastructure::cache::{CacheStats, UtxoCache};
use crate::infrastructure::config::UtxoManagerConfig;
use crate::infrastructure::fetcher::UtxoFetcher;
use crate::infrastructure::rpc::{ChainRpc, KaspaRestClient};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Top-level API over the whole pipeline: cache, fetcher, estimator,
/// strategy chain, lock table and consolidator.
pub struct UtxoManager {
    config: UtxoManagerConfig,
    rpc: Arc<dyn ChainRpc>,
    cache: Arc<UtxoCache>,
    fetcher: Arc<UtxoFetcher>,
    estimator: MassEstimator,
    selector: UtxoSelector,
    consolidator: Consolidator,
    locks: UtxoLockTable,
}

impl std::fmt::Debug for UtxoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtxoManager").field("config", &self.config).finish_non_exhaustive()
    }
}

impl UtxoManager {
    /// Manager over the public REST endpoints.
    pub fn new(config: UtxoManagerConfig) -> Result<Self> {
        let rpc: Arc<dyn ChainRpc> = Arc::new(KaspaRestClient::new()?);
        Self::with_rpc(config, rpc)
    }

    /// Manager configured from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(UtxoManagerConfig::from_env()?)
    }

    /// Manager over an injected chain backend. Config validation is fatal
    /// here; every violation is reported at once.
    pub fn with_rpc(config: UtxoManagerConfig, rpc: Arc<dyn ChainRpc>) -> Result<Self> {
        if let Err(errors) = config.validate() {
            return Err(UtxoError::ConfigError(errors.join("; ")));
        }
        let cache = Arc::new(UtxoCache::new(config.cache_expiry_ms));
        let fetcher = Arc::new(UtxoFetcher::new(rpc.clone(), cache.clone(), config.min_utxo_age_blocks));
        let estimator = config.mass_estimator();
        let selector = UtxoSelector::new(config.min_utxo_age_blocks);
        let consolidator =
            Consolidator::new(fetcher.clone(), estimator, config.max_inputs_per_tx, config.consolidation_threshold);
        Ok(Self { config, rpc, cache, fetcher, estimator, selector, consolidator, locks: UtxoLockTable::new() })
    }

    /// The live validated configuration.
    pub fn config(&self) -> &UtxoManagerConfig {
        &self.config
    }

    /// Selects and locks inputs funding `amount_sompi` from `address`.
    /// Locked outpoints auto-release after 60 s if the caller never
    /// confirms or aborts.
    pub async fn select_for_payment(&self, address: &str, amount_sompi: u64, network: Network) -> Result<SelectedUtxos> {
        let swept = self.locks.cleanup_expired();
        if swept > 0 {
            debug!("expired locks swept count={}", swept);
        }

        let utxos = self.fetcher.fetch(address, network, false).await?;
        if utxos.is_empty() {
            return Err(UtxoError::no_utxos_available(address));
        }

        let unlocked: Vec<_> = utxos.into_iter().filter(|u| !self.locks.is_locked(&u.outpoint_key())).collect();
        if unlocked.is_empty() {
            return Err(UtxoError::all_utxos_locked(address, self.locks.active_count()));
        }

        // Recipient + change.
        let max_inputs = self.estimator.max_inputs(2);
        let max_mass = (self.estimator.estimate(max_inputs, 2).max_allowed_mass as f64 * PAYMENT_MASS_HEADROOM) as u32;

        let selection = self.selector.select_optimal(&unlocked, amount_sompi, max_inputs, max_mass)?;
        for key in selection.outpoint_keys() {
            self.locks.lock(&key, PAYMENT_LOCK_TTL_MS, LockReason::Payment);
        }
        info!(
            "payment selection locked address={} inputs={} total_sompi={} strategy={}",
            address,
            selection.utxos.len(),
            selection.total_amount_sompi,
            selection.strategy_name
        );
        Ok(selection)
    }

    /// Full payment orchestration through the injected builder: select,
    /// submit, release. Retries once on orphan or network failures after
    /// invalidating the cache; a mass rejection surfaces with concrete
    /// recovery suggestions.
    pub async fn pay_with_builder(
        &self,
        private_key: &str,
        recipient_address: &str,
        amount_sompi: u64,
        address: &str,
        network: Network,
        builder: &dyn TransactionBuilder,
    ) -> Result<String> {
        let mut retried = false;
        loop {
            let selection = self.select_for_payment(address, amount_sompi, network).await?;
            let submit = builder.build_and_submit(private_key, recipient_address, amount_sompi, &selection.utxos).await;

            // Locks release on every path past this point.
            self.locks.unlock_many(&selection.outpoint_keys());

            let err = match submit {
                Ok(transaction_id) => {
                    self.cache.invalidate(address, network);
                    info!(
                        "payment submitted address={} recipient={} amount_sompi={} tx_id={}",
                        address, recipient_address, amount_sompi, transaction_id
                    );
                    return Ok(transaction_id);
                }
                Err(err) => err,
            };

            let text = err.to_string();
            match classify_submit_error(&text) {
                SubmitErrorKind::AlreadyAccepted => {
                    let Some(transaction_id) = extract_transaction_id(&text) else {
                        return Err(UtxoError::Message(format!("transaction accepted but id unrecoverable: {}", text)));
                    };
                    self.cache.invalidate(address, network);
                    info!("transaction already accepted tx_id={}", transaction_id);
                    return Ok(transaction_id);
                }
                SubmitErrorKind::Mass => {
                    return Err(UtxoError::TransactionMass {
                        estimated_mass: selection.estimated_mass,
                        max_allowed_mass: self.config.max_mass_bytes,
                        suggested_actions: mass_error_suggestions(),
                    });
                }
                SubmitErrorKind::Orphan if !retried => {
                    retried = true;
                    warn!("orphan rejection, retrying once address={} error={}", address, text);
                    self.cache.invalidate(address, network);
                    sleep(Duration::from_millis(ORPHAN_RETRY_DELAY_MS)).await;
                }
                SubmitErrorKind::Network if !retried => {
                    retried = true;
                    // The submit may have landed before the connection died.
                    if let Some(transaction_id) = extract_transaction_id(&text) {
                        if self.rpc.transaction_exists(&transaction_id, network).await.unwrap_or(false) {
                            self.cache.invalidate(address, network);
                            info!("transaction survived network error tx_id={}", transaction_id);
                            return Ok(transaction_id);
                        }
                    }
                    warn!("network failure on submit, retrying once address={} error={}", address, text);
                    self.cache.invalidate(address, network);
                    sleep(Duration::from_millis(NETWORK_RETRY_DELAY_MS)).await;
                }
                _ => return Err(err),
            }
        }
    }

    pub async fn wallet_health(&self, address: &str, network: Network) -> Result<WalletHealth> {
        let utxos = self.fetcher.fetch(address, network, false).await?;
        let utxo_count = utxos.len() as u32;
        let total_balance_sompi: u64 = utxos.iter().map(|u| u.amount_sompi).sum();

        let ages: Vec<u64> = utxos.iter().map(|u| u.metadata.age_in_blocks).collect();
        let oldest = ages.iter().max().copied().unwrap_or(0);
        let newest = ages.iter().min().copied().unwrap_or(0);
        let average = if ages.is_empty() { 0 } else { ages.iter().sum::<u64>() / ages.len() as u64 };

        let mut amounts: Vec<u64> = utxos.iter().map(|u| u.amount_sompi).collect();
        amounts.sort_unstable_by(|a, b| b.cmp(a));
        let estimated_max_payment_sompi: u64 =
            amounts.iter().take(self.config.max_inputs_per_tx as usize).sum();

        Ok(WalletHealth {
            address: address.to_string(),
            network,
            total_balance_sompi,
            utxo_count,
            fragmentation_score: self.consolidator.fragmentation_score(&utxos),
            oldest_utxo_age_blocks: oldest,
            newest_utxo_age_blocks: newest,
            average_age_blocks: average,
            needs_consolidation: Consolidator::candidate_count(&utxos) > self.config.consolidation_threshold,
            estimated_max_payment_sompi,
        })
    }

    /// Consolidates only when the fragmentation check recommends it.
    pub async fn consolidate_if_needed(
        &self,
        address: &str,
        private_key: &str,
        network: Network,
        builder: &dyn TransactionBuilder,
    ) -> Result<ConsolidationResult> {
        if !self.consolidator.should_consolidate(address, network).await {
            return Ok(ConsolidationResult::skipped());
        }
        Ok(self.consolidator.consolidate(address, private_key, network, builder).await)
    }

    pub async fn consolidation_recommendations(
        &self,
        address: &str,
        network: Network,
    ) -> Result<ConsolidationRecommendation> {
        self.consolidator.recommendations(address, network).await
    }

    /// Polls with forced refresh until any UTXO reaches `min_age_blocks`,
    /// or until the timeout. Fetch failures during a poll are logged and
    /// the loop continues.
    pub async fn wait_for_maturity(&self, address: &str, network: Network, min_age_blocks: u64, timeout_ms: u64) -> bool {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match self.fetcher.fetch(address, network, true).await {
                Ok(utxos) => {
                    if utxos.iter().any(|u| u.metadata.age_in_blocks >= min_age_blocks) {
                        return true;
                    }
                }
                Err(err) => warn!("maturity poll fetch failed address={} error={}", address, err),
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let remaining = deadline - now;
            sleep(remaining.min(Duration::from_millis(MATURITY_POLL_INTERVAL_MS))).await;
        }
    }

    pub fn invalidate_cache(&self, address: &str, network: Network) {
        self.cache.invalidate(address, network);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // Lock API. Advisory only: the chain remains the source of truth.

    pub fn lock(&self, outpoint_key: &str, ttl_ms: u64, reason: LockReason) -> bool {
        self.locks.lock(outpoint_key, ttl_ms, reason)
    }

    pub fn unlock(&self, outpoint_key: &str) {
        self.locks.unlock(outpoint_key)
    }

    pub fn unlock_many(&self, outpoint_keys: &[String]) {
        self.locks.unlock_many(outpoint_keys)
    }

    pub fn is_locked(&self, outpoint_key: &str) -> bool {
        self.locks.is_locked(outpoint_key)
    }

    pub fn cleanup_expired_locks(&self) -> u32 {
        self.locks.cleanup_expired()
    }

    pub fn active_lock_count(&self) -> u32 {
        self.locks.active_count()
    }

    pub fn classify_submit_error(&self, error_text: &str) -> SubmitErrorKind {
        classify_submit_error(error_text)
    }
}
