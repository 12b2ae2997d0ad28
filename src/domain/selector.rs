use crate::domain::model::{EnrichedUtxo, SelectedUtxos};
use crate::domain::strategy::{AgeBasedStrategy, AmountBasedStrategy, HybridStrategy, SelectionStrategy};
use crate::foundation::{Result, UtxoError, APPROX_SECONDS_PER_BLOCK};
use log::{debug, warn};
use serde::Serialize;
use std::time::Instant;

/// Pre-flight verdict of [`UtxoSelector::validate`]. Lets UIs explain an
/// impossible selection before attempting one.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionFeasibility {
    pub possible: bool,
    pub reason: Option<String>,
    pub suggestions: Vec<String>,
}

impl SelectionFeasibility {
    fn ok() -> Self {
        Self { possible: true, reason: None, suggestions: Vec::new() }
    }

    fn not_possible(reason: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self { possible: false, reason: Some(reason.into()), suggestions }
    }
}

/// Runs the strategies in a fixed fallback order over the mature subset
/// of the candidates. The order is part of the public contract: changing
/// it changes which of several valid selections wins.
pub struct UtxoSelector {
    strategies: Vec<Box<dyn SelectionStrategy>>,
    min_utxo_age_blocks: u64,
}

impl UtxoSelector {
    pub fn new(min_utxo_age_blocks: u64) -> Self {
        let strategies: Vec<Box<dyn SelectionStrategy>> = vec![
            Box::new(HybridStrategy::new(min_utxo_age_blocks)),
            Box::new(AgeBasedStrategy),
            Box::new(AmountBasedStrategy),
        ];
        Self { strategies, min_utxo_age_blocks }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn select_optimal(
        &self,
        candidates: &[EnrichedUtxo],
        target_sompi: u64,
        max_inputs: u32,
        max_mass: u32,
    ) -> Result<SelectedUtxos> {
        let started = Instant::now();
        let (mature, fresh): (Vec<&EnrichedUtxo>, Vec<&EnrichedUtxo>) =
            candidates.iter().partition(|u| !u.metadata.is_fresh);

        if mature.is_empty() {
            let fresh_ages: Vec<u64> = fresh.iter().map(|u| u.metadata.age_in_blocks).collect();
            let newest_gap = fresh_ages.iter().max().map_or(self.min_utxo_age_blocks, |oldest| {
                self.min_utxo_age_blocks.saturating_sub(*oldest)
            });
            warn!(
                "no mature utxos candidates={} min_age_blocks={} wait_estimate_secs={}",
                candidates.len(),
                self.min_utxo_age_blocks,
                newest_gap * APPROX_SECONDS_PER_BLOCK
            );
            return Err(UtxoError::InsufficientMatureUtxos {
                total: candidates.len() as u32,
                mature: 0,
                fresh_ages,
                min_age_blocks: self.min_utxo_age_blocks,
                estimated_wait_blocks: newest_gap,
            });
        }

        let mature_owned: Vec<EnrichedUtxo> = mature.into_iter().cloned().collect();
        let mut attempted: Vec<String> = Vec::new();
        for strategy in &self.strategies {
            attempted.push(strategy.name().to_string());
            if let Some(result) = strategy.select(&mature_owned, target_sompi, max_inputs, max_mass) {
                let fresh_utxos_used = result.utxos.iter().filter(|u| u.metadata.is_fresh).count() as u32;
                debug!(
                    "selection done strategy={} inputs={} total_sompi={} mass={} elapsed_ms={}",
                    result.strategy_name,
                    result.utxos.len(),
                    result.total_amount_sompi,
                    result.estimated_mass,
                    started.elapsed().as_millis()
                );
                return Ok(SelectedUtxos {
                    utxos: result.utxos,
                    total_amount_sompi: result.total_amount_sompi,
                    estimated_mass: result.estimated_mass,
                    strategy_name: result.strategy_name,
                    warnings: result.warnings,
                    selection_time_ms: started.elapsed().as_millis() as u64,
                    strategies_attempted: attempted,
                    fresh_utxos_used,
                });
            }
        }

        let available_sompi: u64 = mature_owned.iter().map(|u| u.amount_sompi).sum();
        Err(UtxoError::NoStrategySatisfies { available_sompi, target_sompi, strategies_tried: attempted })
    }

    /// Cheap feasibility predicate over the raw candidate list. Checks, in
    /// order: empty list, insufficient total, target unreachable within
    /// the input cap.
    pub fn validate(candidates: &[EnrichedUtxo], target_sompi: u64, max_inputs: u32) -> SelectionFeasibility {
        if candidates.is_empty() {
            return SelectionFeasibility::not_possible(
                "no UTXOs available",
                vec!["fund the address and wait for the transaction to confirm".to_string()],
            );
        }

        let total: u64 = candidates.iter().map(|u| u.amount_sompi).sum();
        if total < target_sompi {
            return SelectionFeasibility::not_possible(
                format!("insufficient balance: {} sompi available, {} required", total, target_sompi),
                vec!["fund the address".to_string()],
            );
        }

        let mut amounts: Vec<u64> = candidates.iter().map(|u| u.amount_sompi).collect();
        amounts.sort_unstable_by(|a, b| b.cmp(a));
        let reachable: u64 = amounts.iter().take(max_inputs as usize).sum();
        if reachable < target_sompi {
            return SelectionFeasibility::not_possible(
                format!(
                    "target {} sompi cannot be reached with {} inputs (best {} sompi)",
                    target_sompi, max_inputs, reachable
                ),
                vec![
                    "raise max_inputs_per_tx".to_string(),
                    "consolidate small UTXOs into larger ones".to_string(),
                ],
            );
        }

        SelectionFeasibility::ok()
    }
}
