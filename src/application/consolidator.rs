use crate::application::submit::TransactionBuilder;
use crate::domain::mass::MassEstimator;
use crate::domain::model::{ConsolidationRecommendation, ConsolidationResult, EnrichedUtxo};
use crate::foundation::{
    Network, Result, CONSOLIDATION_BASE_FEE_SOMPI, CONSOLIDATION_MAX_CANDIDATE_SOMPI, CONSOLIDATION_MIN_AGE_BLOCKS,
    FRAGMENTATION_AMOUNT_SCALE, MASS_PER_INPUT_BYTES,
};
use crate::infrastructure::fetcher::UtxoFetcher;
use log::{debug, info, warn};
use std::sync::Arc;

/// Detects fragmentation and folds small mature UTXOs into a single
/// self-send through the injected builder. Everything here is
/// best-effort: failures are reported in the result, never raised.
pub struct Consolidator {
    fetcher: Arc<UtxoFetcher>,
    estimator: MassEstimator,
    max_inputs_per_tx: u32,
    consolidation_threshold: u32,
}

impl Consolidator {
    pub fn new(
        fetcher: Arc<UtxoFetcher>,
        estimator: MassEstimator,
        max_inputs_per_tx: u32,
        consolidation_threshold: u32,
    ) -> Self {
        Self { fetcher, estimator, max_inputs_per_tx, consolidation_threshold }
    }

    /// A candidate is mature by the consolidation bar (stricter than the
    /// payment bar) and small (< 1 KAS).
    pub fn is_candidate(utxo: &EnrichedUtxo) -> bool {
        utxo.metadata.age_in_blocks >= CONSOLIDATION_MIN_AGE_BLOCKS
            && utxo.amount_sompi < CONSOLIDATION_MAX_CANDIDATE_SOMPI
    }

    pub fn candidate_count(utxos: &[EnrichedUtxo]) -> u32 {
        utxos.iter().filter(|u| Self::is_candidate(u)).count() as u32
    }

    async fn candidates(&self, address: &str, network: Network) -> Result<Vec<EnrichedUtxo>> {
        let utxos = self.fetcher.fetch(address, network, false).await?;
        let mut candidates: Vec<EnrichedUtxo> = utxos.into_iter().filter(Self::is_candidate).collect();
        candidates.sort_by(|a, b| b.metadata.age_in_blocks.cmp(&a.metadata.age_in_blocks));
        Ok(candidates)
    }

    pub async fn should_consolidate(&self, address: &str, network: Network) -> bool {
        match self.candidates(address, network).await {
            Ok(candidates) => candidates.len() as u32 > self.consolidation_threshold,
            Err(err) => {
                warn!("consolidation check failed address={} error={}", address, err);
                false
            }
        }
    }

    /// Caps the candidate list at the configured input ceiling, then
    /// linearly reduces it until the `(n, 1)` estimate fits the mass
    /// budget.
    fn bounded_take(&self, mut candidates: Vec<EnrichedUtxo>) -> Vec<EnrichedUtxo> {
        let mut n = candidates.len().min(self.max_inputs_per_tx as usize);
        while n > 0 && !self.estimator.is_within_limit(n as u32, 1) {
            n -= 1;
        }
        candidates.truncate(n);
        candidates
    }

    pub async fn consolidate(
        &self,
        address: &str,
        private_key: &str,
        network: Network,
        builder: &dyn TransactionBuilder,
    ) -> ConsolidationResult {
        let candidates = match self.candidates(address, network).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!("consolidation fetch failed address={} error={}", address, err);
                return ConsolidationResult {
                    error: Some(err.to_string()),
                    ..ConsolidationResult::skipped()
                };
            }
        };

        let selected = self.bounded_take(candidates);
        if selected.len() < 2 {
            debug!("consolidation skipped address={} candidates={}", address, selected.len());
            return ConsolidationResult::skipped();
        }

        let total: u64 = selected.iter().map(|u| u.amount_sompi).sum();
        let amount = total.saturating_sub(CONSOLIDATION_BASE_FEE_SOMPI);
        if amount == 0 {
            debug!("consolidation skipped address={} total_sompi={} below base fee", address, total);
            return ConsolidationResult::skipped();
        }

        match builder.build_and_submit(private_key, address, amount, &selected).await {
            Ok(transaction_id) => {
                self.fetcher.invalidate(address, network);
                info!(
                    "consolidated utxos address={} inputs={} amount_sompi={} tx_id={}",
                    address,
                    selected.len(),
                    amount,
                    transaction_id
                );
                ConsolidationResult {
                    success: true,
                    utxos_consolidated: selected.len() as u32,
                    transaction_id: Some(transaction_id),
                    amount_consolidated_sompi: amount,
                    error: None,
                }
            }
            Err(err) => {
                warn!("consolidation build failed address={} error={}", address, err);
                ConsolidationResult { error: Some(err.to_string()), ..ConsolidationResult::skipped() }
            }
        }
    }

    /// 0-100 composite: count pressure (40), small-UTXO share (30),
    /// amount dispersion (30). The dispersion term runs in a /10^6-scaled
    /// space so the square root stays well inside f64 precision.
    pub fn fragmentation_score(&self, utxos: &[EnrichedUtxo]) -> u32 {
        if utxos.is_empty() {
            return 0;
        }
        let n = utxos.len() as f64;
        let count_score = (n / 20.0).min(1.0) * 40.0;

        let small = utxos.iter().filter(|u| u.amount_sompi < CONSOLIDATION_MAX_CANDIDATE_SOMPI).count() as f64;
        let small_score = small / n * 30.0;

        let scaled: Vec<f64> = utxos.iter().map(|u| (u.amount_sompi / FRAGMENTATION_AMOUNT_SCALE) as f64).collect();
        let mean = scaled.iter().sum::<f64>() / n;
        let variance_score = if mean > 0.0 {
            let variance = scaled.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            (variance.sqrt() / mean).min(1.0) * 30.0
        } else {
            0.0
        };

        (count_score + small_score + variance_score).round() as u32
    }

    pub async fn recommendations(&self, address: &str, network: Network) -> Result<ConsolidationRecommendation> {
        let utxos = self.fetcher.fetch(address, network, false).await?;
        let fragmentation_score = self.fragmentation_score(&utxos);
        let candidate_count = Self::candidate_count(&utxos);
        let should_consolidate = candidate_count > self.consolidation_threshold;
        let recommendation = if should_consolidate {
            format!("Consolidate {} small mature UTXOs into a single output", candidate_count)
        } else {
            "No consolidation needed".to_string()
        };
        Ok(ConsolidationRecommendation {
            should_consolidate,
            fragmentation_score,
            candidate_count,
            estimated_mass_savings: candidate_count.saturating_sub(1).saturating_mul(MASS_PER_INPUT_BYTES),
            recommendation,
        })
    }
}
