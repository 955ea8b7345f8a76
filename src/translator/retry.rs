use std::future::Future;

use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::core::config::RetryPolicy;

/// Runs `operation` under `policy`, returning the last error once attempts run out.
///
/// `max_attempts` counts the first call, so a policy of 1 never retries and 0
/// is treated as 1.
pub async fn with_retry<F, Fut, T, E>(policy: RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let strategy = ExponentialBackoff::from_millis(policy.base_delay_ms.max(1))
        .map(jitter)
        .take(policy.max_attempts.saturating_sub(1));

    Retry::spawn(strategy, operation).await
}
