use crate::domain::model::{EnrichedUtxo, SelectionResult};
use crate::domain::strategy::{greedy_select, SelectionStrategy};
use crate::foundation::HYBRID_FULL_SCORE_AGE_BLOCKS;
use serde::Serialize;

const AGE_WEIGHT: f64 = 0.40;
const AMOUNT_WEIGHT: f64 = 0.30;
const MASS_WEIGHT: f64 = 0.30;

/// Mass contributions at or above this many bytes score 0.
const MASS_SCORE_CEILING: f64 = 300.0;

/// Per-UTXO score breakdown, consumed by diagnostic tooling.
#[derive(Clone, Debug, Serialize)]
pub struct UtxoScoreDetail {
    pub outpoint_key: String,
    pub age_score: f64,
    pub amount_score: f64,
    pub mass_score: f64,
    pub total_score: f64,
}

/// Weighted-score selection balancing maturity, value coverage and mass
/// footprint (40/30/30).
#[derive(Clone, Copy, Debug)]
pub struct HybridStrategy {
    min_utxo_age_blocks: u64,
}

impl HybridStrategy {
    pub fn new(min_utxo_age_blocks: u64) -> Self {
        Self { min_utxo_age_blocks }
    }

    /// 0 for fresh UTXOs, 100 from `HYBRID_FULL_SCORE_AGE_BLOCKS` on,
    /// linear in between starting at the configured maturity bar.
    fn age_score(&self, utxo: &EnrichedUtxo) -> f64 {
        if utxo.metadata.is_fresh {
            return 0.0;
        }
        let age = utxo.metadata.age_in_blocks;
        if age >= HYBRID_FULL_SCORE_AGE_BLOCKS || self.min_utxo_age_blocks >= HYBRID_FULL_SCORE_AGE_BLOCKS {
            return 100.0;
        }
        let span = (HYBRID_FULL_SCORE_AGE_BLOCKS - self.min_utxo_age_blocks) as f64;
        age.saturating_sub(self.min_utxo_age_blocks) as f64 * 100.0 / span
    }

    /// 100 when the UTXO covers the target alone, otherwise its truncated
    /// percentage of the target, capped at 99.
    fn amount_score(utxo: &EnrichedUtxo, target_sompi: u64) -> f64 {
        if utxo.amount_sompi >= target_sompi {
            return 100.0;
        }
        let pct = (utxo.amount_sompi as u128 * 100) / target_sompi as u128;
        (pct as u64).min(99) as f64
    }

    fn mass_score(utxo: &EnrichedUtxo) -> f64 {
        let contribution = (utxo.metadata.estimated_mass_contribution as f64).clamp(0.0, MASS_SCORE_CEILING);
        (1.0 - contribution / MASS_SCORE_CEILING) * 100.0
    }

    fn total_score(&self, utxo: &EnrichedUtxo, target_sompi: u64) -> f64 {
        AGE_WEIGHT * self.age_score(utxo)
            + AMOUNT_WEIGHT * Self::amount_score(utxo, target_sompi)
            + MASS_WEIGHT * Self::mass_score(utxo)
    }

    /// Full per-UTXO breakdown in candidate order.
    pub fn detailed_scores(&self, utxos: &[EnrichedUtxo], target_sompi: u64) -> Vec<UtxoScoreDetail> {
        utxos
            .iter()
            .map(|u| {
                let age_score = self.age_score(u);
                let amount_score = Self::amount_score(u, target_sompi);
                let mass_score = Self::mass_score(u);
                UtxoScoreDetail {
                    outpoint_key: u.outpoint_key(),
                    age_score,
                    amount_score,
                    mass_score,
                    total_score: AGE_WEIGHT * age_score + AMOUNT_WEIGHT * amount_score + MASS_WEIGHT * mass_score,
                }
            })
            .collect()
    }
}

impl SelectionStrategy for HybridStrategy {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn select(
        &self,
        candidates: &[EnrichedUtxo],
        target_sompi: u64,
        max_inputs: u32,
        max_mass: u32,
    ) -> Option<SelectionResult> {
        let mut scored: Vec<(f64, EnrichedUtxo)> =
            candidates.iter().map(|u| (self.total_score(u, target_sompi), u.clone())).collect();
        // Stable sort: equal scores keep candidate order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        let sorted: Vec<EnrichedUtxo> = scored.into_iter().map(|(_, u)| u).collect();
        greedy_select(&sorted, target_sompi, max_inputs, max_mass, self.name())
    }
}
