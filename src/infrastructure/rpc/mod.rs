pub mod client;
pub mod retry;

pub use client::KaspaRestClient;

use crate::domain::model::RawUtxo;
use crate::foundation::{Network, Result};
use async_trait::async_trait;

/// Read-side chain access consumed by the fetcher and the submission
/// recovery path. Implemented by [`KaspaRestClient`] against the public
/// REST endpoints and by in-memory mocks in tests.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn utxos_by_address(&self, address: &str, network: Network) -> Result<Vec<RawUtxo>>;

    async fn virtual_daa_score(&self, network: Network) -> Result<u64>;

    /// Whether the chain already knows `transaction_id`. Used to recover
    /// after a network error on submit.
    async fn transaction_exists(&self, transaction_id: &str, network: Network) -> Result<bool>;
}
