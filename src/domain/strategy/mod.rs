//! Selection strategies. All three share the greedy accumulator below and
//! differ only in the order they feed candidates into it.

mod age;
mod amount;
mod hybrid;

pub use age::AgeBasedStrategy;
pub use amount::AmountBasedStrategy;
pub use hybrid::{HybridStrategy, UtxoScoreDetail};

use crate::domain::model::{EnrichedUtxo, SelectionResult};
use crate::foundation::{MASS_BASE_OVERHEAD_BYTES, MASS_PER_OUTPUT_BYTES};

/// One selection policy. `None` means "no solution", never an error;
/// warnings on a returned result are advisory.
pub trait SelectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn select(
        &self,
        candidates: &[EnrichedUtxo],
        target_sompi: u64,
        max_inputs: u32,
        max_mass: u32,
    ) -> Option<SelectionResult>;
}

/// Accumulates already-sorted candidates until the target is covered or a
/// limit trips. Each accepted input reserves an extra output's worth of
/// mass on top of its own contribution; the caller's `max_mass` already
/// carries the planned outputs, so the increment is a safety margin.
pub(crate) fn greedy_select(
    sorted: &[EnrichedUtxo],
    target_sompi: u64,
    max_inputs: u32,
    max_mass: u32,
    strategy_name: &str,
) -> Option<SelectionResult> {
    let mut mass = MASS_BASE_OVERHEAD_BYTES;
    let mut total: u64 = 0;
    let mut selected: Vec<EnrichedUtxo> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for utxo in sorted {
        if selected.len() as u32 >= max_inputs {
            warnings.push(format!("Reached maximum input count ({})", max_inputs));
            break;
        }
        let new_mass = mass
            .saturating_add(utxo.metadata.estimated_mass_contribution)
            .saturating_add(MASS_PER_OUTPUT_BYTES);
        if new_mass > max_mass {
            warnings.push(format!("Mass limit reached at {} of {} bytes", new_mass, max_mass));
            break;
        }
        total = total.saturating_add(utxo.amount_sompi);
        mass = new_mass;
        selected.push(utxo.clone());

        if total >= target_sompi {
            let fresh_count = selected.iter().filter(|u| u.metadata.is_fresh).count();
            if fresh_count > 0 {
                warnings.push(format!("Using {} fresh UTXOs (storage mass penalty risk)", fresh_count));
            }
            return Some(SelectionResult {
                utxos: selected,
                total_amount_sompi: total,
                estimated_mass: mass,
                strategy_name: strategy_name.to_string(),
                warnings,
            });
        }
    }
    None
}

pub(crate) fn sort_by_age_desc(utxos: &mut [EnrichedUtxo]) {
    utxos.sort_by(|a, b| b.metadata.age_in_blocks.cmp(&a.metadata.age_in_blocks));
}

pub(crate) fn sort_by_amount_desc(utxos: &mut [EnrichedUtxo]) {
    utxos.sort_by(|a, b| b.amount_sompi.cmp(&a.amount_sompi));
}
