//! Redis-based issuance rate limiter
//!
//! Sliding window per subject and purpose kept in a sorted set, so every
//! service instance sharing the Redis server applies the same budget.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use vt_core::services::{IssueRateLimiter, RateDecision};

use super::redis_client::RedisClient;

/// Trim the window, then either count the request or report the oldest entry.
/// Returns `{allowed, oldest_score_ms}`.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
if redis.call('ZCARD', key) >= limit then
  local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
  return {0, tonumber(oldest[2])}
end
redis.call('ZADD', key, now, ARGV[4])
redis.call('PEXPIRE', key, window)
return {1, 0}
"#;

/// Redis-based implementation of the issuance rate limiter
pub struct RedisIssueRateLimiter {
    redis_client: RedisClient,
    limit: u32,
    window: Duration,
    script: redis::Script,
}

impl RedisIssueRateLimiter {
    /// Create a new Redis-based rate limiter
    ///
    /// # Arguments
    ///
    /// * `redis_client` - Shared Redis connection
    /// * `limit` - Issuances allowed per key within `window` (0 disables the rule)
    /// * `window` - Length of the sliding window
    pub fn new(redis_client: RedisClient, limit: u32, window: Duration) -> Self {
        Self {
            redis_client,
            limit,
            window,
            script: redis::Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    /// Redis key for a limiter key; subject identifiers never reach Redis in clear
    pub fn storage_key(&self, key: &str) -> String {
        self.redis_client.key(&format!("rate_limit:issue:{}", hash_key(key)))
    }
}

#[async_trait]
impl IssueRateLimiter for RedisIssueRateLimiter {
    async fn check_and_record(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, String> {
        if self.limit == 0 {
            return Ok(RateDecision::Allowed);
        }

        let now_ms = now.timestamp_millis();
        let window_ms = self.window.num_milliseconds().max(1);
        let member = format!("{}-{}", now_ms, Uuid::new_v4());
        let mut conn = self.redis_client.get_connection();

        let mut invocation = self.script.key(self.storage_key(key));
        invocation.arg(now_ms).arg(window_ms).arg(self.limit).arg(member);

        let (allowed, oldest_ms): (i64, i64) = tokio::time::timeout(
            self.redis_client.response_timeout(),
            invocation.invoke_async(&mut conn),
        )
        .await
        .map_err(|_| "Rate limit check timed out".to_string())?
        .map_err(|e| format!("Failed to check rate limit: {}", e))?;

        if allowed == 1 {
            return Ok(RateDecision::Allowed);
        }

        Ok(RateDecision::Limited {
            retry_after_seconds: retry_after_seconds(oldest_ms, window_ms, now_ms),
        })
    }
}

/// Whole seconds until the oldest entry leaves the window, at least one
pub(crate) fn retry_after_seconds(oldest_ms: i64, window_ms: i64, now_ms: i64) -> u64 {
    let remaining_ms = oldest_ms.saturating_add(window_ms).saturating_sub(now_ms);
    let seconds = (remaining_ms + 999) / 1000;
    u64::try_from(seconds.max(1)).unwrap_or(1)
}

pub(crate) fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
