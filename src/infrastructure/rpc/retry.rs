use crate::foundation::{Result, UtxoError};
use log::warn;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async operation with exponential backoff
/// (`base_delay * 2^(attempt-1)` between attempts). Returns the last
/// error once the attempts are exhausted.
pub async fn retry_with_backoff<F, Fut, T>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("attempt failed attempt={} of={} error={}", attempt, attempts, err);
                last_err = Some(err);
                if attempt < attempts {
                    sleep(base_delay * 2u32.saturating_pow(attempt - 1)).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| UtxoError::Message("retry exhausted".to_string())))
}
