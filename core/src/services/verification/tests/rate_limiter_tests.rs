//! Unit tests for the in-memory issuance rate limiter

use chrono::{Duration, Utc};

use crate::services::verification::{InMemoryIssueRateLimiter, IssueRateLimiter, RateDecision};

#[tokio::test]
async fn test_allows_up_to_limit() {
    let limiter = InMemoryIssueRateLimiter::new(3, Duration::minutes(1));
    let now = Utc::now();

    for _ in 0..3 {
        assert_eq!(limiter.check_and_record("k", now).await, Ok(RateDecision::Allowed));
    }
    assert_eq!(
        limiter.check_and_record("k", now).await,
        Ok(RateDecision::Limited { retry_after_seconds: 60 })
    );
}

#[tokio::test]
async fn test_window_slides() {
    let limiter = InMemoryIssueRateLimiter::new(2, Duration::minutes(1));
    let start = Utc::now();

    limiter.check_and_record("k", start).await.unwrap();
    limiter.check_and_record("k", start + Duration::seconds(30)).await.unwrap();

    assert_eq!(
        limiter.check_and_record("k", start + Duration::seconds(45)).await,
        Ok(RateDecision::Limited { retry_after_seconds: 15 })
    );
    assert_eq!(
        limiter.check_and_record("k", start + Duration::seconds(61)).await,
        Ok(RateDecision::Allowed)
    );
}

#[tokio::test]
async fn test_keys_are_independent() {
    let limiter = InMemoryIssueRateLimiter::new(1, Duration::minutes(1));
    let now = Utc::now();

    assert_eq!(limiter.check_and_record("a", now).await, Ok(RateDecision::Allowed));
    assert_eq!(limiter.check_and_record("b", now).await, Ok(RateDecision::Allowed));
    assert!(matches!(
        limiter.check_and_record("a", now).await,
        Ok(RateDecision::Limited { .. })
    ));
}

#[tokio::test]
async fn test_zero_limit_disables_rule() {
    let limiter = InMemoryIssueRateLimiter::new(0, Duration::minutes(1));
    let now = Utc::now();

    for _ in 0..100 {
        assert_eq!(limiter.check_and_record("k", now).await, Ok(RateDecision::Allowed));
    }
}

#[tokio::test]
async fn test_idle_keys_are_dropped_on_the_prune_cadence() {
    let limiter = InMemoryIssueRateLimiter::new(1, Duration::minutes(1)).with_prune_every(4);
    let start = Utc::now();

    for key in ["a", "b", "c"] {
        limiter.check_and_record(key, start).await.unwrap();
    }
    assert_eq!(limiter.tracked_keys().await, 3);

    // The fourth call scans every key; the stale ones go
    let later = start + Duration::minutes(2);
    assert_eq!(limiter.check_and_record("d", later).await, Ok(RateDecision::Allowed));
    assert_eq!(limiter.tracked_keys().await, 1);
}
