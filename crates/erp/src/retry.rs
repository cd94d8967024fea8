//! Exponential backoff for transient upstream failures.

use std::future::Future;
use std::time::Duration;

use consolidator_core::ledger::SourceError;
use consolidator_shared::config::ErpConfig;
use consolidator_shared::types::EntityId;

/// Retry policy for ERP calls.
///
/// Only `SourceError::Unavailable` is retried. The delay starts at
/// `initial_delay` and doubles after every attempt, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy with the configured retry count and default delays.
    #[must_use]
    pub fn from_config(config: &ErpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            ..Self::default()
        }
    }

    /// Runs `call` until it succeeds, fails permanently or retries run out.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        entity: EntityId,
        mut call: F,
    ) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 0;

        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            operation,
                            entity = %entity,
                            retries = attempt,
                            "ERP call succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        entity = %entity,
                        attempt,
                        ?delay,
                        error = %e,
                        "ERP call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.max_delay);
                }
                Err(e) => {
                    tracing::error!(
                        operation,
                        entity = %entity,
                        retries = attempt,
                        error = %e,
                        "ERP call failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}
