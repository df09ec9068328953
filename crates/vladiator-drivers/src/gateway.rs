// Path: crates/vladiator-drivers/src/gateway.rs
//! Retry policy wrapping a driver's RPC calls (spec §4.1's "(ambient)" note):
//! exponential backoff, bounded attempts, `tracing::debug!` on each
//! transient failure.

use crate::driver::DriverError;
use std::future::Future;
use std::time::Duration;

/// Bounded retry attempts before a transient RPC failure is surfaced to the
/// caller.
const MAX_ATTEMPTS: usize = 8;
const BASE_BACKOFF_MS: u64 = 50;
const MAX_BACKOFF_MS: u64 = 800;

fn backoff_delay(attempt: usize) -> Duration {
    let ms = BASE_BACKOFF_MS
        .saturating_mul(1u64 << attempt)
        .min(MAX_BACKOFF_MS);
    Duration::from_millis(ms)
}

/// Retries `operation` up to [`MAX_ATTEMPTS`] times with exponential
/// backoff, but only for [`DriverError::Rpc`] failures — a decode, connect,
/// or sign error is never transient and is returned immediately.
pub async fn with_retry<F, Fut, T>(label: &'static str, mut operation: F) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(DriverError::Rpc(e)) if attempt + 1 < MAX_ATTEMPTS => {
                tracing::debug!(
                    target: "drivers",
                    rpc_call = label,
                    attempt,
                    error = %e,
                    "transient RPC failure; retrying"
                );
                tokio::time::sleep(backoff_delay(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("test", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(DriverError::Rpc("timeout".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_non_transport_errors() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), DriverError> = with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DriverError::Decode("bad payload".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
