//! System-wide constants for the UTXO management core.

/// Sompi per KAS (10^8).
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Estimated mass contribution of one transaction input, in bytes.
///
/// Outpoint (36) + schnorr signature script (65) + sequence (8) + per-input
/// overhead (~91), rounded to a stable figure the whole selection pipeline
/// shares.
pub const MASS_PER_INPUT_BYTES: u32 = 200;

/// Estimated mass contribution of one transaction output, in bytes.
pub const MASS_PER_OUTPUT_BYTES: u32 = 50;

/// Fixed transaction overhead (version, counts, lock time), in bytes.
pub const MASS_BASE_OVERHEAD_BYTES: u32 = 100;

/// Chain-enforced hard mass ceiling per transaction, in bytes.
pub const DEFAULT_MAX_MASS_BYTES: u32 = 100_000;

/// Default fraction of the hard mass ceiling selections may use.
pub const DEFAULT_MASS_LIMIT_BUFFER: f64 = 0.9;

/// Default block age below which a UTXO is considered fresh.
pub const DEFAULT_MIN_UTXO_AGE_BLOCKS: u64 = 10;

/// Default hard cap on inputs per transaction.
pub const DEFAULT_MAX_INPUTS_PER_TX: u32 = 5;

/// Default small-UTXO count above which consolidation is recommended.
pub const DEFAULT_CONSOLIDATION_THRESHOLD: u32 = 10;

/// Default TTL on cached per-address UTXO listings, in milliseconds.
pub const DEFAULT_CACHE_EXPIRY_MS: u64 = 10_000;

/// Extra headroom applied on top of the estimator ceiling for payments.
pub const PAYMENT_MASS_HEADROOM: f64 = 0.9;

/// TTL on per-UTXO payment locks, in milliseconds.
pub const PAYMENT_LOCK_TTL_MS: u64 = 60_000;

/// Maturity bar for consolidation candidates, in blocks.
///
/// Stricter than the configurable payment bar; consolidation is
/// discretionary and must never trip the storage-mass penalty.
pub const CONSOLIDATION_MIN_AGE_BLOCKS: u64 = 10;

/// Upper amount bound for a consolidation candidate (1 KAS).
pub const CONSOLIDATION_MAX_CANDIDATE_SOMPI: u64 = SOMPI_PER_KASPA;

/// Flat base fee deducted from a consolidation self-send, in sompi.
pub const CONSOLIDATION_BASE_FEE_SOMPI: u64 = 10_000;

/// Attempts for the UTXO listing endpoint before giving up.
pub const FETCH_RETRY_ATTEMPTS: u32 = 3;

/// Base delay of the exponential fetch backoff (1 s, 2 s, 4 s).
pub const FETCH_RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Per-request timeout on outbound HTTP calls, in seconds.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Poll interval of the maturity wait loop, in milliseconds.
pub const MATURITY_POLL_INTERVAL_MS: u64 = 2_000;

/// Delay before the single automatic retry after an orphan rejection.
pub const ORPHAN_RETRY_DELAY_MS: u64 = 2_000;

/// Delay before the single automatic retry after a network failure.
pub const NETWORK_RETRY_DELAY_MS: u64 = 3_000;

/// Age at which a UTXO earns the full hybrid age score, in blocks.
pub const HYBRID_FULL_SCORE_AGE_BLOCKS: u64 = 10;

/// Divisor moving sompi amounts into the scaled space used for the
/// fragmentation variance term.
pub const FRAGMENTATION_AMOUNT_SCALE: u64 = 1_000_000;

/// Kaspa produces roughly one block per second; block deltas double as a
/// wait-time estimate in seconds.
pub const APPROX_SECONDS_PER_BLOCK: u64 = 1;
