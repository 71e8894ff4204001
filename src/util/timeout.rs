//! Timeout helper.

use std::future::Future;
use std::time::Duration;

/// Marker error produced when [`with_timeout`] gives up on a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut(pub Duration);

/// Wrap a fallible future with a timeout.
///
/// The error type only has to know how to represent an elapsed deadline,
/// so the same helper serves the OAuth exchanges and the REST requests.
pub async fn with_timeout<T, E>(
    duration: Duration,
    future: impl Future<Output = Result<T, E>>,
) -> Result<T, E>
where
    E: From<TimedOut>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(TimedOut(duration).into()),
    }
}
