use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use sp_core::ports::PreferenceApiError;
use sp_core::AppConfig;

/// Retry settings for preferences calls.
///
/// Only retryable errors (transport failures) are retried; rejections and
/// validation errors are returned on the first attempt. The wait grows
/// linearly: `backoff`, `2 * backoff`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub async fn run<F, Fut, T>(&self, op: &str, mut action: F) -> Result<T, PreferenceApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PreferenceApiError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match action().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    let backoff = self.backoff_after(attempt);
                    warn!(op, attempt, error = %err, ?backoff, "preferences call failed, retrying");
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(op, attempts = attempt, error = %err, "preferences call failed");
                    return Err(err);
                }
            }
        }
    }

    /// Wait before the attempt following `attempt`. Saturates instead of
    /// overflowing for large configured steps.
    fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
