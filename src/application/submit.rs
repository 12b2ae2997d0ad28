use crate::domain::model::EnrichedUtxo;
use crate::foundation::Result;
use async_trait::async_trait;

/// Injected transaction build-and-broadcast callback. The core never
/// signs or serializes transactions; it hands a selection to this seam
/// and gets back a broadcast transaction id.
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
    async fn build_and_submit(
        &self,
        private_key: &str,
        recipient_address: &str,
        amount_sompi: u64,
        inputs: &[EnrichedUtxo],
    ) -> Result<String>;
}

/// Classification of a chain-submit failure reported by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitErrorKind {
    Mass,
    Orphan,
    InsufficientFunds,
    Network,
    /// The node already has the transaction; treated as success once the
    /// id is recovered from the error body.
    AlreadyAccepted,
    Unknown,
}

/// Maps the node's error text onto the recovery policy. Match order
/// matters: "insufficient" must win over the generic network bucket.
pub fn classify_submit_error(error_text: &str) -> SubmitErrorKind {
    let lower = error_text.to_ascii_lowercase();
    if lower.contains("already accepted") {
        SubmitErrorKind::AlreadyAccepted
    } else if lower.contains("storage mass") || lower.contains("transaction mass") {
        SubmitErrorKind::Mass
    } else if lower.contains("orphan") || lower.contains("missing outpoint") {
        SubmitErrorKind::Orphan
    } else if lower.contains("insufficient") {
        SubmitErrorKind::InsufficientFunds
    } else if lower.contains("econnrefused")
        || lower.contains("econnaborted")
        || lower.contains("websocket")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("network error")
    {
        SubmitErrorKind::Network
    } else {
        SubmitErrorKind::Unknown
    }
}

/// Recovers a transaction id embedded in an error body: the first 64-char
/// hex run.
pub fn extract_transaction_id(error_text: &str) -> Option<String> {
    error_text
        .split(|c: char| !c.is_ascii_hexdigit())
        .find(|token| token.len() == 64)
        .map(str::to_string)
}

pub fn mass_error_suggestions() -> Vec<String> {
    vec![
        "wait for recently received UTXOs to mature before retrying".to_string(),
        "reduce the payment amount so fewer inputs are required".to_string(),
        "consolidate small UTXOs into larger ones".to_string(),
    ]
}
