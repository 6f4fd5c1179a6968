//! Redis issuance rate limiter against a real server
//!
//! Run with `REDIS_URL=redis://... cargo test -p vt_infra -- --ignored`

use chrono::{Duration, Utc};
use uuid::Uuid;

use vt_core::{IssueRateLimiter, RateDecision};
use vt_infra::{RedisClient, RedisIssueRateLimiter};
use vt_shared::CacheConfig;

async fn limiter(limit: u32) -> RedisIssueRateLimiter {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let client = RedisClient::new(CacheConfig::new(url)).await.expect("redis not reachable");
    RedisIssueRateLimiter::new(client, limit, Duration::minutes(1))
}

#[tokio::test]
#[ignore] // Requires running Redis
async fn test_limit_applies_per_key() {
    let limiter = limiter(2).await;
    let key = format!("email_confirm:it-{}", Uuid::new_v4());
    let now = Utc::now();

    assert_eq!(limiter.check_and_record(&key, now).await.unwrap(), RateDecision::Allowed);
    assert_eq!(limiter.check_and_record(&key, now).await.unwrap(), RateDecision::Allowed);
    assert!(matches!(
        limiter.check_and_record(&key, now).await.unwrap(),
        RateDecision::Limited { retry_after_seconds } if (1..=60).contains(&retry_after_seconds)
    ));

    let other = format!("email_confirm:it-{}", Uuid::new_v4());
    assert_eq!(limiter.check_and_record(&other, now).await.unwrap(), RateDecision::Allowed);
}

#[tokio::test]
#[ignore] // Requires running Redis
async fn test_window_slides() {
    let limiter = limiter(1).await;
    let key = format!("phone_confirm:it-{}", Uuid::new_v4());
    let now = Utc::now();

    assert_eq!(limiter.check_and_record(&key, now).await.unwrap(), RateDecision::Allowed);
    assert!(matches!(
        limiter.check_and_record(&key, now + Duration::seconds(30)).await.unwrap(),
        RateDecision::Limited { .. }
    ));
    assert_eq!(
        limiter.check_and_record(&key, now + Duration::seconds(61)).await.unwrap(),
        RateDecision::Allowed
    );
}
