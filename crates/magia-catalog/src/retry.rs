//! Retry with exponential back-off and jitter for catalog reads.
//!
//! Catalog reads are idempotent GETs, so transient failures (timeouts,
//! connection errors, 5xx, 429) are retried. Everything else is returned
//! immediately so the caller can fall back to the static catalog quickly.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`CatalogError::RateLimited`]: HTTP 429.
/// - [`CatalogError::Http`]: timeout or connect failure.
/// - [`CatalogError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:** 4xx statuses, malformed bodies, bad base URL, and
/// anything from the fallback catalog.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::RateLimited { .. } => true,
        CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
        CatalogError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        CatalogError::Deserialize { .. }
        | CatalogError::InvalidBaseUrl { .. }
        | CatalogError::Normalization { .. }
        | CatalogError::FallbackIo { .. }
        | CatalogError::FallbackParse(_)
        | CatalogError::FallbackValidation(_) => false,
    }
}

/// Upper bound on any single sleep between attempts.
const MAX_DELAY_MS: u64 = 10_000;

/// Milliseconds to wait before retry number `attempt` (1-based).
///
/// The exponential delay `backoff_base_ms × 2^(attempt-1)` is capped and then
/// scaled by `jitter` (expected in `0.75..1.25`). A 429 carrying
/// `Retry-After` waits at least that long, still under the same cap.
fn delay_before_retry(err: &CatalogError, attempt: u32, backoff_base_ms: u64, jitter: f64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * jitter) as u64;
    let floor = match err {
        CatalogError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt       |
/// |---------|---------------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter      |
/// | 2       | 500 ms × 2¹ ± 25 % jitter      |
/// | 3       | 500 ms × 2² ± 25 % jitter      |
///
/// A rate-limited response waits at least its `Retry-After`. Every delay is
/// capped at 10 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }
        attempt += 1;
        let jitter = rand::random::<f64>() * 0.5 + 0.75;
        let delay_ms = delay_before_retry(&err, attempt, backoff_base_ms, jitter);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "catalog read failed, retrying"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
