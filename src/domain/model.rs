use crate::foundation::{Network, Outpoint, MASS_PER_INPUT_BYTES};
use serde::{Deserialize, Deserializer, Serialize};

/// Decodes a field the REST API serves as either a JSON number or a
/// decimal string (amounts and DAA scores are stringified for JS clients).
pub(crate) fn de_string_or_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) => Ok(s.trim().parse::<u64>().ok()),
    }
}

/// Script public key as served by the REST API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPublicKey {
    #[serde(default)]
    pub version: u16,
    #[serde(default)]
    pub script: String,
}

/// Wire-format UTXO entry. Fields are permissive so a malformed element
/// can be dropped without failing the whole listing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUtxoEntry {
    #[serde(default, deserialize_with = "de_string_or_u64")]
    pub amount: Option<u64>,
    #[serde(default)]
    pub script_public_key: Option<ScriptPublicKey>,
    #[serde(default, deserialize_with = "de_string_or_u64")]
    pub block_daa_score: Option<u64>,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutpoint {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

/// One element of `GET /addresses/{addr}/utxos`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUtxo {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub outpoint: Option<RawOutpoint>,
    #[serde(default)]
    pub utxo_entry: Option<RawUtxoEntry>,
}

/// Maturity and mass metadata stamped onto a UTXO at enrichment time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UtxoMetadata {
    /// Wall-clock ms at enrichment.
    pub fetched_at_ms: u64,
    /// `virtual_daa_score - block_daa_score`, clamped at 0.
    pub age_in_blocks: u64,
    /// `age_in_blocks < config.min_utxo_age_blocks`; spending fresh
    /// outputs risks the storage-mass penalty.
    pub is_fresh: bool,
    /// Byte contribution of spending this UTXO as an input.
    pub estimated_mass_contribution: u32,
}

/// A validated, metadata-carrying UTXO - the unit the whole selection
/// pipeline operates on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnrichedUtxo {
    pub outpoint: Outpoint,
    pub amount_sompi: u64,
    pub script_public_key: ScriptPublicKey,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
    pub metadata: UtxoMetadata,
}

impl EnrichedUtxo {
    /// Identity key shared by the lock table and selection bookkeeping.
    pub fn outpoint_key(&self) -> String {
        self.outpoint.key()
    }
}

/// Validates a wire UTXO and enriches it against the current virtual DAA
/// score. Returns `None` for malformed entries (missing transaction id,
/// index or amount).
pub fn enrich_utxo(
    raw: &RawUtxo,
    virtual_daa_score: u64,
    min_utxo_age_blocks: u64,
    fetched_at_ms: u64,
) -> Option<EnrichedUtxo> {
    let outpoint = raw.outpoint.as_ref()?;
    let transaction_id = outpoint.transaction_id.clone()?;
    let index = outpoint.index?;
    let entry = raw.utxo_entry.as_ref()?;
    let amount_sompi = entry.amount?;
    let block_daa_score = entry.block_daa_score.unwrap_or(0);

    let age_in_blocks = virtual_daa_score.saturating_sub(block_daa_score);
    Some(EnrichedUtxo {
        outpoint: Outpoint::new(transaction_id, index),
        amount_sompi,
        script_public_key: entry.script_public_key.clone().unwrap_or_default(),
        block_daa_score,
        is_coinbase: entry.is_coinbase,
        metadata: UtxoMetadata {
            fetched_at_ms,
            age_in_blocks,
            is_fresh: age_in_blocks < min_utxo_age_blocks,
            estimated_mass_contribution: MASS_PER_INPUT_BYTES,
        },
    })
}

/// Output of a single strategy attempt.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionResult {
    pub utxos: Vec<EnrichedUtxo>,
    pub total_amount_sompi: u64,
    pub estimated_mass: u32,
    pub strategy_name: String,
    pub warnings: Vec<String>,
}

/// A winning selection with provenance, as returned by the selector.
#[derive(Clone, Debug, Serialize)]
pub struct SelectedUtxos {
    pub utxos: Vec<EnrichedUtxo>,
    pub total_amount_sompi: u64,
    pub estimated_mass: u32,
    pub strategy_name: String,
    pub warnings: Vec<String>,
    pub selection_time_ms: u64,
    pub strategies_attempted: Vec<String>,
    /// Telemetry hook; always 0 today because the selector filters fresh
    /// UTXOs before any strategy runs.
    pub fresh_utxos_used: u32,
}

impl SelectedUtxos {
    pub fn outpoint_keys(&self) -> Vec<String> {
        self.utxos.iter().map(EnrichedUtxo::outpoint_key).collect()
    }
}

/// Byte breakdown of a mass estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MassBreakdown {
    pub inputs: u32,
    pub outputs: u32,
    pub overhead: u32,
}

/// Estimated byte mass of a hypothetical transaction.
#[derive(Clone, Debug, Serialize)]
pub struct MassEstimate {
    pub estimated_mass: u32,
    /// Raw configured ceiling; the buffered ceiling only gates
    /// `is_within_limit`.
    pub max_allowed_mass: u32,
    pub breakdown: MassBreakdown,
    pub is_within_limit: bool,
    /// Truncating integer percent of the raw ceiling.
    pub utilization_percent: u32,
}

/// Aggregate view of an address's spendable state.
#[derive(Clone, Debug, Serialize)]
pub struct WalletHealth {
    pub address: String,
    pub network: Network,
    pub total_balance_sompi: u64,
    pub utxo_count: u32,
    pub fragmentation_score: u32,
    pub oldest_utxo_age_blocks: u64,
    pub newest_utxo_age_blocks: u64,
    pub average_age_blocks: u64,
    pub needs_consolidation: bool,
    /// Sum of the top `max_inputs_per_tx` amounts - the largest payment a
    /// single transaction can fund.
    pub estimated_max_payment_sompi: u64,
}

/// Outcome of a consolidation attempt. Consolidation is best-effort:
/// build failures land here, never as errors.
#[derive(Clone, Debug, Serialize)]
pub struct ConsolidationResult {
    pub success: bool,
    pub utxos_consolidated: u32,
    pub transaction_id: Option<String>,
    pub amount_consolidated_sompi: u64,
    pub error: Option<String>,
}

impl ConsolidationResult {
    pub fn skipped() -> Self {
        Self { success: false, utxos_consolidated: 0, transaction_id: None, amount_consolidated_sompi: 0, error: None }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ConsolidationRecommendation {
    pub should_consolidate: bool,
    pub fragmentation_score: u32,
    pub candidate_count: u32,
    /// Input mass future payments stop carrying once the candidates
    /// collapse into one output.
    pub estimated_mass_savings: u32,
    pub recommendation: String,
}
