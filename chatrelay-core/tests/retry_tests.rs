//! Tests for retry policy and executor behavior

use chatrelay_core::converter::ConversionError;
use chatrelay_core::providers::{ProviderError, RetryExecutor, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        exponential_base: 2.0,
        jitter_factor: 0.0,
        respect_retry_after: true,
        timeout_ms: None,
    }
}

#[test]
fn test_retry_policy_configurations() {
    let default_policy = RetryPolicy::default();
    assert_eq!(default_policy.max_retries, 3);
    assert_eq!(default_policy.exponential_base, 2.0);
    assert!(default_policy.respect_retry_after);

    let no_retry = RetryPolicy::no_retry();
    assert_eq!(no_retry.max_retries, 0);
}

#[test]
fn test_jitter_stays_within_range() {
    let policy = RetryPolicy {
        max_retries: 3,
        initial_delay_ms: 1000,
        max_delay_ms: 10_000,
        exponential_base: 2.0,
        jitter_factor: 0.1,
        respect_retry_after: false,
        timeout_ms: None,
    };
    let error = ProviderError::Network("reset".into());

    for _ in 0..50 {
        let delay = policy.calculate_delay(1, &error).as_millis();
        assert!((1800..=2200).contains(&delay), "delay {delay} out of range");
    }
}

#[test]
fn test_retry_after_is_capped() {
    let policy = fast_policy(3);
    let error = ProviderError::RateLimit {
        message: "slow down".into(),
        retry_after: Some(Duration::from_secs(60)),
    };
    assert_eq!(policy.calculate_delay(0, &error), Duration::from_millis(5));
}

#[tokio::test]
async fn test_retry_executor_success_after_failures() {
    let executor = RetryExecutor::new(fast_policy(3));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result = executor
        .execute(|| async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ProviderError::ServerError {
                    status: 503,
                    message: "unavailable".into(),
                })
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.result, Some("done"));
    assert_eq!(result.attempts, 2);
    assert_eq!(result.error_history.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_executor_gives_up_after_max_retries() {
    let executor = RetryExecutor::new(fast_policy(2));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result = executor
        .execute(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProviderError::Timeout("slow".into()))
        })
        .await;

    assert!(result.result.is_none());
    assert!(matches!(result.final_error, Some(ProviderError::Timeout(_))));
    // One initial attempt plus two retries
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_authentication_errors_never_retried() {
    let executor = RetryExecutor::new(fast_policy(5));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result = executor
        .run(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProviderError::Authentication("invalid key".into()))
        })
        .await;

    assert!(matches!(result, Err(ProviderError::Authentication(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_responses_never_retried() {
    let executor = RetryExecutor::new(fast_policy(5));
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result = executor
        .run(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProviderError::from(ConversionError::MalformedResponse(
                "No choices in provider response".into(),
            )))
        })
        .await;

    assert!(matches!(
        result,
        Err(ProviderError::Conversion(ConversionError::MalformedResponse(_)))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let policy = RetryPolicy {
        max_retries: 10,
        initial_delay_ms: 20,
        max_delay_ms: 20,
        exponential_base: 1.0,
        jitter_factor: 0.0,
        respect_retry_after: false,
        timeout_ms: Some(30),
    };
    let executor = RetryExecutor::new(policy);

    let result = executor
        .run(|| async { Err::<(), _>(ProviderError::Network("reset".into())) })
        .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}
