//! Tests for utility modules (retry, timeout).

mod auth_support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tado_client::auth::AuthError;
use tado_client::error::TadoError;
use tado_client::util::retry::RetryPolicy;
use tado_client::util::timeout::with_timeout;

use auth_support::ManualClock;

#[tokio::test]
async fn retry_policy_backs_off_on_the_given_clock() {
    let policy = RetryPolicy {
        max_attempts: 4,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(1),
        multiplier: 2.0,
    };
    let clock = ManualClock::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();

    let result = policy
        .execute(&*clock, || {
            let attempts = attempts_for_task.clone();
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(TadoError::Timeout(100))
                } else {
                    Ok::<_, TadoError>("ok")
                }
            }
        })
        .await;

    assert_eq!(result.expect("retry result"), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let sleeps = clock.sleeps();
    assert_eq!(sleeps.len(), 2);
    assert!(
        (Duration::from_millis(75)..=Duration::from_millis(125)).contains(&sleeps[0]),
        "{sleeps:?}"
    );
    assert!(
        (Duration::from_millis(150)..=Duration::from_millis(250)).contains(&sleeps[1]),
        "{sleeps:?}"
    );
}

#[tokio::test]
async fn retry_policy_none_runs_once() {
    let clock = ManualClock::new();
    let attempts = AtomicUsize::new(0);

    let result: Result<(), TadoError> = RetryPolicy::none()
        .execute(&*clock, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TadoError::from_status(502, "bad gateway")) }
        })
        .await;

    assert!(matches!(result, Err(TadoError::Server { status: 502, .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn with_timeout_maps_elapsed_deadline_into_error_type() {
    let rest: Result<(), TadoError> = with_timeout(Duration::from_secs(2), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    })
    .await;
    let auth: Result<(), AuthError> = with_timeout(Duration::from_millis(250), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    })
    .await;

    assert!(matches!(rest, Err(TadoError::Timeout(2000))));
    assert!(matches!(auth, Err(AuthError::RequestTimeout(250))));
}

#[tokio::test(start_paused = true)]
async fn with_timeout_passes_through_results() {
    let value: Result<u8, TadoError> = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
    let err: Result<u8, TadoError> =
        with_timeout(Duration::from_secs(1), async { Err(TadoError::from_status(404, "gone")) })
            .await;

    assert_eq!(value.expect("value"), 7);
    assert!(matches!(err, Err(TadoError::Api { status: 404, .. })));
}
