//! Exponential backoff retry policy.

use modlogs_core::error::FetchError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Configuration for the retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds (caps exponential growth).
    pub max_backoff_ms: u64,
    /// Multiplier applied to backoff on each retry.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

/// Stateless retry policy: computes the next delay given the attempt number.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(RetryConfig {
            max_retries: 0,
            ..Default::default()
        })
    }

    /// Returns the delay before the `attempt`-th retry (1-based).
    /// Returns `None` if `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let base_ms = self.config.initial_backoff_ms as f64
            * self.config.multiplier.powi((attempt - 1) as i32);
        let capped = base_ms.min(self.config.max_backoff_ms as f64);
        Some(Duration::from_millis(capped as u64))
    }

    /// Run `op` until it succeeds, fails with a permanent error, or the
    /// retry budget is spent. `what` names the operation in logs.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => match self.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            what,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(attempt, error = %e, what, "max retries exceeded");
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for TransportError {
    fn is_retryable(&self) -> bool {
        TransportError::is_retryable(self)
    }
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        FetchError::is_retryable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        });
        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(3), Some(Duration::from_millis(400)));
        assert!(policy.next_delay(4).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 500,
            multiplier: 10.0,
        });
        assert_eq!(policy.next_delay(5), Some(Duration::from_millis(500)));
    }

    #[test]
    fn none_never_retries() {
        assert!(RetryPolicy::none().next_delay(1).is_none());
    }

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
            multiplier: 2.0,
        })
    }

    #[tokio::test]
    async fn rate_limit_is_retried_until_success() {
        let mut calls = 0u32;
        let result: Result<u32, FetchError> = quick(3)
            .run("getLogs", || {
                calls += 1;
                let n = calls;
                async move {
                    if n < 3 {
                        Err(FetchError::RateLimited {
                            source_name: "etherscan".into(),
                        })
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_returned_at_once() {
        let mut calls = 0u32;
        let result: Result<(), FetchError> = quick(3)
            .run("listing", || {
                calls += 1;
                async { Err(FetchError::Api { message: "NOTOK".into() }) }
            })
            .await;
        assert!(matches!(result, Err(FetchError::Api { .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn budget_bounds_the_attempts() {
        let mut calls = 0u32;
        let result: Result<(), TransportError> = quick(2)
            .run("eth_getTransactionByHash", || {
                calls += 1;
                async { Err(TransportError::Http("connection reset".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
