use crate::domain::model::{MassBreakdown, MassEstimate};
use crate::foundation::{MASS_BASE_OVERHEAD_BYTES, MASS_PER_INPUT_BYTES, MASS_PER_OUTPUT_BYTES};

/// Stateless byte-mass model of a hypothetical transaction.
///
/// Strategies call this many times per selection; everything here is
/// integer arithmetic over three constants. Construct via
/// [`UtxoManagerConfig::mass_estimator`](crate::infrastructure::config::UtxoManagerConfig::mass_estimator).
#[derive(Clone, Copy, Debug)]
pub struct MassEstimator {
    max_mass_bytes: u32,
    mass_limit_buffer: f64,
    max_inputs_per_tx: u32,
}

impl MassEstimator {
    pub fn new(max_mass_bytes: u32, mass_limit_buffer: f64, max_inputs_per_tx: u32) -> Self {
        Self { max_mass_bytes, mass_limit_buffer, max_inputs_per_tx }
    }

    /// Buffered ceiling selections must stay under.
    pub fn effective_mass_limit(&self) -> u32 {
        (self.max_mass_bytes as f64 * self.mass_limit_buffer).floor() as u32
    }

    pub fn estimate(&self, inputs: u32, outputs: u32) -> MassEstimate {
        let input_mass = inputs.saturating_mul(MASS_PER_INPUT_BYTES);
        let output_mass = outputs.saturating_mul(MASS_PER_OUTPUT_BYTES);
        let estimated_mass = input_mass.saturating_add(output_mass).saturating_add(MASS_BASE_OVERHEAD_BYTES);
        MassEstimate {
            estimated_mass,
            max_allowed_mass: self.max_mass_bytes,
            breakdown: MassBreakdown { inputs: input_mass, outputs: output_mass, overhead: MASS_BASE_OVERHEAD_BYTES },
            is_within_limit: estimated_mass <= self.effective_mass_limit(),
            utilization_percent: estimated_mass.saturating_mul(100) / self.max_mass_bytes.max(1),
        }
    }

    /// Largest input count that fits `outputs` outputs under the buffered
    /// ceiling, clamped to the configured per-transaction cap.
    pub fn max_inputs(&self, outputs: u32) -> u32 {
        let reserved = outputs.saturating_mul(MASS_PER_OUTPUT_BYTES).saturating_add(MASS_BASE_OVERHEAD_BYTES);
        let available = self.effective_mass_limit().saturating_sub(reserved);
        (available / MASS_PER_INPUT_BYTES).min(self.max_inputs_per_tx)
    }

    pub fn is_within_limit(&self, inputs: u32, outputs: u32) -> bool {
        self.estimate(inputs, outputs).is_within_limit
    }
}
