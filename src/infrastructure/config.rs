use crate::domain::mass::MassEstimator;
use crate::foundation::{
    Result, UtxoError, DEFAULT_CACHE_EXPIRY_MS, DEFAULT_CONSOLIDATION_THRESHOLD, DEFAULT_MASS_LIMIT_BUFFER,
    DEFAULT_MAX_INPUTS_PER_TX, DEFAULT_MAX_MASS_BYTES, DEFAULT_MIN_UTXO_AGE_BLOCKS,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_UTXO_AGE_BLOCKS_ENV: &str = "MIN_UTXO_AGE_BLOCKS";
pub const MAX_INPUTS_PER_TX_ENV: &str = "MAX_INPUTS_PER_TX";
pub const CONSOLIDATION_THRESHOLD_ENV: &str = "CONSOLIDATION_THRESHOLD";
pub const MASS_LIMIT_BUFFER_ENV: &str = "MASS_LIMIT_BUFFER";
pub const MAX_MASS_BYTES_ENV: &str = "MAX_MASS_BYTES";
pub const CACHE_EXPIRY_MS_ENV: &str = "CACHE_EXPIRY_MS";

/// Tuning knobs of the UTXO management core. Validated once at manager
/// construction; invalid values are fatal there.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UtxoManagerConfig {
    /// Age below which a UTXO counts as fresh; raise to stay clear of the
    /// storage-mass penalty.
    pub min_utxo_age_blocks: u64,
    /// Hard ceiling on inputs per transaction, honored by strategies and
    /// the mass estimator alike.
    pub max_inputs_per_tx: u32,
    /// Small-UTXO count above which consolidation is recommended.
    pub consolidation_threshold: u32,
    /// Fraction of `max_mass_bytes` selections may actually use.
    pub mass_limit_buffer: f64,
    /// Chain's hard per-transaction mass limit.
    pub max_mass_bytes: u32,
    /// TTL on cached per-address listings.
    pub cache_expiry_ms: u64,
}

impl Default for UtxoManagerConfig {
    fn default() -> Self {
        Self {
            min_utxo_age_blocks: DEFAULT_MIN_UTXO_AGE_BLOCKS,
            max_inputs_per_tx: DEFAULT_MAX_INPUTS_PER_TX,
            consolidation_threshold: DEFAULT_CONSOLIDATION_THRESHOLD,
            mass_limit_buffer: DEFAULT_MASS_LIMIT_BUFFER,
            max_mass_bytes: DEFAULT_MAX_MASS_BYTES,
            cache_expiry_ms: DEFAULT_CACHE_EXPIRY_MS,
        }
    }
}

fn env_override<T: FromStr>(var: &str, slot: &mut T) -> Result<()> {
    match std::env::var(var) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(());
            }
            *slot = trimmed
                .parse::<T>()
                .map_err(|_| UtxoError::ConfigError(format!("invalid {} value: {}", var, trimmed)))?;
            Ok(())
        }
        Err(_) => Ok(()),
    }
}

impl UtxoManagerConfig {
    /// Defaults overridden by whichever of the six env vars are set.
    /// Unparseable values are configuration errors, not silent defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        env_override(MIN_UTXO_AGE_BLOCKS_ENV, &mut config.min_utxo_age_blocks)?;
        env_override(MAX_INPUTS_PER_TX_ENV, &mut config.max_inputs_per_tx)?;
        env_override(CONSOLIDATION_THRESHOLD_ENV, &mut config.consolidation_threshold)?;
        env_override(MASS_LIMIT_BUFFER_ENV, &mut config.mass_limit_buffer)?;
        env_override(MAX_MASS_BYTES_ENV, &mut config.max_mass_bytes)?;
        env_override(CACHE_EXPIRY_MS_ENV, &mut config.cache_expiry_ms)?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_inputs_per_tx == 0 {
            errors.push("max_inputs_per_tx must be >= 1".to_string());
        }
        if self.consolidation_threshold < 2 {
            errors.push("consolidation_threshold must be >= 2".to_string());
        }
        if !(self.mass_limit_buffer > 0.0 && self.mass_limit_buffer <= 1.0) {
            errors.push(format!("mass_limit_buffer must be in (0, 1], got {}", self.mass_limit_buffer));
        }
        if self.max_mass_bytes == 0 {
            errors.push("max_mass_bytes must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn mass_estimator(&self) -> MassEstimator {
        MassEstimator::new(self.max_mass_bytes, self.mass_limit_buffer, self.max_inputs_per_tx)
    }
}
