#![allow(dead_code)]

use kaspa_utxo_manager::domain::{EnrichedUtxo, ScriptPublicKey, UtxoMetadata};
use kaspa_utxo_manager::foundation::Outpoint;

/// Base virtual DAA score the builders pretend the chain is at.
pub const BUILDER_VIRTUAL_DAA_SCORE: u64 = 1_000_000;

pub struct UtxoBuilder {
    transaction_id: String,
    index: u32,
    amount_sompi: u64,
    age_in_blocks: u64,
    min_utxo_age_blocks: u64,
    is_coinbase: bool,
}

impl Default for UtxoBuilder {
    fn default() -> Self {
        Self {
            transaction_id: "11".repeat(32),
            index: 0,
            amount_sompi: 100_000_000,
            age_in_blocks: 100,
            min_utxo_age_blocks: 10,
            is_coinbase: false,
        }
    }
}

impl UtxoBuilder {
    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = transaction_id.into();
        self
    }

    pub fn index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn amount_sompi(mut self, amount_sompi: u64) -> Self {
        self.amount_sompi = amount_sompi;
        self
    }

    pub fn age_in_blocks(mut self, age_in_blocks: u64) -> Self {
        self.age_in_blocks = age_in_blocks;
        self
    }

    pub fn min_utxo_age_blocks(mut self, min_utxo_age_blocks: u64) -> Self {
        self.min_utxo_age_blocks = min_utxo_age_blocks;
        self
    }

    pub fn coinbase(mut self, is_coinbase: bool) -> Self {
        self.is_coinbase = is_coinbase;
        self
    }

    pub fn build(self) -> EnrichedUtxo {
        EnrichedUtxo {
            outpoint: Outpoint::new(self.transaction_id, self.index),
            amount_sompi: self.amount_sompi,
            script_public_key: ScriptPublicKey { version: 0, script: "20aa".to_string() },
            block_daa_score: BUILDER_VIRTUAL_DAA_SCORE.saturating_sub(self.age_in_blocks),
            is_coinbase: self.is_coinbase,
            metadata: UtxoMetadata {
                fetched_at_ms: 1,
                age_in_blocks: self.age_in_blocks,
                is_fresh: self.age_in_blocks < self.min_utxo_age_blocks,
                estimated_mass_contribution: 200,
            },
        }
    }
}
