use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FetchFailed,
    NoUtxosAvailable,
    AllUtxosLocked,
    InsufficientMatureUtxos,
    NoStrategySatisfies,
    TransactionMass,
    Fragmentation,
    NetworkError,
    ParseError,
    ConfigError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

/// Recommended operator action attached to a fragmentation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentationAction {
    Consolidate,
    Wait,
}

impl std::fmt::Display for FragmentationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentationAction::Consolidate => write!(f, "consolidate"),
            FragmentationAction::Wait => write!(f, "wait"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UtxoError {
    #[error("utxo fetch failed after {attempts} attempts: {last_error}")]
    FetchFailed { attempts: u32, last_error: String },

    #[error("no UTXOs available for address {address}")]
    NoUtxosAvailable { address: String },

    #[error("all UTXOs are locked for address {address} ({locked} in-flight)")]
    AllUtxosLocked { address: String, locked: u32 },

    #[error(
        "insufficient mature UTXOs: {mature} of {total} mature (fresh ages {fresh_ages:?}, \
         required age {min_age_blocks} blocks, estimated wait {estimated_wait_blocks} blocks)"
    )]
    InsufficientMatureUtxos {
        total: u32,
        mature: u32,
        fresh_ages: Vec<u64>,
        min_age_blocks: u64,
        estimated_wait_blocks: u64,
    },

    #[error(
        "no strategy satisfies target {target_sompi} sompi with {available_sompi} sompi mature \
         (tried {strategies_tried:?})"
    )]
    NoStrategySatisfies { available_sompi: u64, target_sompi: u64, strategies_tried: Vec<String> },

    #[error(
        "transaction mass {estimated_mass} exceeds allowed {max_allowed_mass} bytes; \
         suggested actions: {suggested_actions:?}"
    )]
    TransactionMass { estimated_mass: u32, max_allowed_mass: u32, suggested_actions: Vec<String> },

    #[error("wallet fragmentation score {score} requires action: {action}")]
    Fragmentation { score: u32, action: FragmentationAction },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, UtxoError>;

impl UtxoError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UtxoError::FetchFailed { .. } => ErrorCode::FetchFailed,
            UtxoError::NoUtxosAvailable { .. } => ErrorCode::NoUtxosAvailable,
            UtxoError::AllUtxosLocked { .. } => ErrorCode::AllUtxosLocked,
            UtxoError::InsufficientMatureUtxos { .. } => ErrorCode::InsufficientMatureUtxos,
            UtxoError::NoStrategySatisfies { .. } => ErrorCode::NoStrategySatisfies,
            UtxoError::TransactionMass { .. } => ErrorCode::TransactionMass,
            UtxoError::Fragmentation { .. } => ErrorCode::Fragmentation,
            UtxoError::NetworkError(_) => ErrorCode::NetworkError,
            UtxoError::ParseError(_) => ErrorCode::ParseError,
            UtxoError::ConfigError(_) => ErrorCode::ConfigError,
            UtxoError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn fetch_failed(attempts: u32, last_error: impl Into<String>) -> Self {
        UtxoError::FetchFailed { attempts, last_error: last_error.into() }
    }

    pub fn no_utxos_available(address: impl Into<String>) -> Self {
        UtxoError::NoUtxosAvailable { address: address.into() }
    }

    pub fn all_utxos_locked(address: impl Into<String>, locked: u32) -> Self {
        UtxoError::AllUtxosLocked { address: address.into(), locked }
    }
}

impl From<reqwest::Error> for UtxoError {
    fn from(err: reqwest::Error) -> Self {
        UtxoError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for UtxoError {
    fn from(err: serde_json::Error) -> Self {
        UtxoError::ParseError(format!("json decode error: {}", err))
    }
}

impl From<std::num::ParseIntError> for UtxoError {
    fn from(err: std::num::ParseIntError) -> Self {
        UtxoError::ParseError(format!("integer parse error: {}", err))
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `UtxoError` variants at the call site to preserve context.
