//! Time source for poll scheduling and the activation ceiling.

use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Monotonic clock plus cooperative sleep.
///
/// The device-flow loop never reads time or sleeps any other way, so an
/// implementation that advances virtual time makes the whole loop run
/// instantly and deterministically.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_secs(300)).await;
        assert!(clock.now() - start >= Duration::from_secs(300));
    }
}
