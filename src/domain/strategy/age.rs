use crate::domain::model::{EnrichedUtxo, SelectionResult};
use crate::domain::strategy::{greedy_select, sort_by_age_desc, SelectionStrategy};

pub const FRESH_FALLBACK_WARNING: &str = "Had to use fresh UTXOs due to insufficient mature balance";

/// Oldest-first selection. Tries mature UTXOs alone before widening to the
/// full set, keeping the storage-mass penalty off the hot path whenever
/// the mature balance suffices.
#[derive(Clone, Copy, Debug, Default)]
pub struct AgeBasedStrategy;

impl SelectionStrategy for AgeBasedStrategy {
    fn name(&self) -> &'static str {
        "age-based"
    }

    fn select(
        &self,
        candidates: &[EnrichedUtxo],
        target_sompi: u64,
        max_inputs: u32,
        max_mass: u32,
    ) -> Option<SelectionResult> {
        let (mut mature, mut fresh): (Vec<EnrichedUtxo>, Vec<EnrichedUtxo>) =
            candidates.iter().cloned().partition(|u| !u.metadata.is_fresh);
        sort_by_age_desc(&mut mature);
        sort_by_age_desc(&mut fresh);

        if let Some(result) = greedy_select(&mature, target_sompi, max_inputs, max_mass, self.name()) {
            return Some(result);
        }

        let mut widened = mature;
        widened.extend(fresh);
        greedy_select(&widened, target_sompi, max_inputs, max_mass, self.name()).map(|mut result| {
            result.warnings.push(FRESH_FALLBACK_WARNING.to_string());
            result
        })
    }
}
