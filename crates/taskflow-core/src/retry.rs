//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Run `op` up to `attempts` times, sleeping `initial_backoff` after the
/// first failure and doubling the delay after each subsequent one. The
/// final error is returned as-is; callers that want a fallback value apply
/// it to the returned `Err`.
///
/// `attempts` of zero is treated as one.
pub async fn retry_with_backoff<T, E, F, Fut>(
    attempts: u32,
    initial_backoff: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut backoff = initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(_) => {
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying after failure");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}
