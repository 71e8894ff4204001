//! Backoff for idempotent tado API reads.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::auth::Clock;
use crate::error::TadoError;

/// How often and how patiently a GET is repeated after a retryable
/// [`TadoError`] (5xx, timeouts, transport failures).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that runs the operation exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Un-jittered wait before retry number `retry` (0-based), capped at
    /// `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_backoff.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_backoff
        }
    }

    /// Run `operation`, sleeping on `clock` between attempts.
    pub async fn execute<F, Fut, T>(&self, clock: &dyn Clock, mut operation: F) -> Result<T, TadoError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TadoError>>,
    {
        let mut retry = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_retryable() || retry + 1 >= self.max_attempts {
                return Err(err);
            }

            let wait = self.backoff(retry).mul_f64(jitter());
            tracing::warn!(
                attempt = retry + 1,
                max_attempts = self.max_attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "Retrying tado request"
            );
            clock.sleep(wait).await;
            retry += 1;
        }
    }
}

/// Spread of 75% to 125% around the nominal backoff.
fn jitter() -> f64 {
    rand::rng().random_range(0.75..=1.25)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokioClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        }
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(10), Duration::from_secs(30));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_in_band() {
        for _ in 0..100 {
            let factor = jitter();
            assert!((0.75..=1.25).contains(&factor), "{factor}");
        }
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TadoError> = fast_policy(3)
            .execute(&TokioClock, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TadoError::from_status(403, "forbidden")) }
            })
            .await;
        assert!(matches!(result, Err(TadoError::Forbidden(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TadoError> = fast_policy(2)
            .execute(&TokioClock, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TadoError::Timeout(10)) }
            })
            .await;
        assert!(matches!(result, Err(TadoError::Timeout(10))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
