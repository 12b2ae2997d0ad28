use crate::domain::model::{EnrichedUtxo, SelectionResult};
use crate::domain::strategy::{greedy_select, sort_by_amount_desc, SelectionStrategy};
use crate::foundation::{MASS_BASE_OVERHEAD_BYTES, MASS_PER_OUTPUT_BYTES};

/// Largest-first selection. Prefers a single covering UTXO; fewer inputs
/// means a smaller transaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct AmountBasedStrategy;

impl AmountBasedStrategy {
    /// Smallest single UTXO that covers the target on its own, if any.
    fn find_optimal_single<'a>(sorted_desc: &'a [EnrichedUtxo], target_sompi: u64) -> Option<&'a EnrichedUtxo> {
        sorted_desc.iter().take_while(|u| u.amount_sompi >= target_sompi).last()
    }
}

impl SelectionStrategy for AmountBasedStrategy {
    fn name(&self) -> &'static str {
        "amount-based"
    }

    fn select(
        &self,
        candidates: &[EnrichedUtxo],
        target_sompi: u64,
        max_inputs: u32,
        max_mass: u32,
    ) -> Option<SelectionResult> {
        let mut sorted = candidates.to_vec();
        sort_by_amount_desc(&mut sorted);

        if max_inputs >= 1 {
            if let Some(single) = Self::find_optimal_single(&sorted, target_sompi) {
                let mass = MASS_BASE_OVERHEAD_BYTES
                    .saturating_add(single.metadata.estimated_mass_contribution)
                    .saturating_add(MASS_PER_OUTPUT_BYTES);
                if mass <= max_mass {
                    let mut warnings = Vec::new();
                    if single.metadata.is_fresh {
                        warnings.push("Using 1 fresh UTXOs (storage mass penalty risk)".to_string());
                    }
                    return Some(SelectionResult {
                        utxos: vec![single.clone()],
                        total_amount_sompi: single.amount_sompi,
                        estimated_mass: mass,
                        strategy_name: self.name().to_string(),
                        warnings,
                    });
                }
            }
        }

        greedy_select(&sorted, target_sompi, max_inputs, max_mass, self.name())
    }
}
