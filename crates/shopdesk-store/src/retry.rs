//! Retry with exponential back-off and jitter for store reads.
//!
//! Only queries go through [`retry_with_backoff`]. Mutations are sent once:
//! a timed-out mutation may still have been applied.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connect failures, HTTP 429 and 5xx.
///
/// **Not retriable:** any other API status, decode failures, and the
/// repository-level `NotFound` / `Conflict` outcomes.
pub(crate) fn is_retriable(err: &StoreError) -> bool {
    match err {
        StoreError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        StoreError::Api { status, .. } => *status == 429 || (500..600).contains(status),
        StoreError::Deserialize { .. }
        | StoreError::Encode { .. }
        | StoreError::NotFound { .. }
        | StoreError::Conflict(_)
        | StoreError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "store read failed transiently, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api(status: u16) -> StoreError {
        StoreError::Api {
            status,
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn rate_limited_and_server_errors_are_retriable() {
        assert!(is_retriable(&api(429)));
        assert!(is_retriable(&api(500)));
        assert!(is_retriable(&api(503)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&api(400)));
        assert!(!is_retriable(&api(401)));
        assert!(!is_retriable(&api(409)));
        assert!(!is_retriable(&StoreError::Conflict("referenced".to_owned())));
        assert!(!is_retriable(&StoreError::NotFound {
            kind: "product",
            id: "p1".to_owned()
        }));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(api(503))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api(500))
            }
        })
        .await;
        assert!(matches!(result, Err(StoreError::Api { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
    }

    #[tokio::test]
    async fn does_not_retry_client_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api(400))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
