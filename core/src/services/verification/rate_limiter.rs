//! Sliding-window issuance rate limiter kept in process memory

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use super::traits::{IssueRateLimiter, RateDecision};

/// Calls between full scans for keys that went idle
const DEFAULT_PRUNE_EVERY: u64 = 1024;

#[derive(Default)]
struct Hits {
    by_key: HashMap<String, VecDeque<DateTime<Utc>>>,
    calls: u64,
}

/// Allows at most `limit` issuances per key within `window`
///
/// A limit of zero disables the rule.
pub struct InMemoryIssueRateLimiter {
    limit: u32,
    window: Duration,
    prune_every: u64,
    hits: Mutex<Hits>,
}

impl InMemoryIssueRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            prune_every: DEFAULT_PRUNE_EVERY,
            hits: Mutex::new(Hits::default()),
        }
    }

    /// Scan for idle keys every `calls` calls instead of the default cadence
    pub fn with_prune_every(mut self, calls: u64) -> Self {
        self.prune_every = calls.max(1);
        self
    }

    /// Number of keys currently holding hits
    pub async fn tracked_keys(&self) -> usize {
        self.hits.lock().await.by_key.len()
    }
}

#[async_trait]
impl IssueRateLimiter for InMemoryIssueRateLimiter {
    async fn check_and_record(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, String> {
        if self.limit == 0 {
            return Ok(RateDecision::Allowed);
        }

        let mut hits = self.hits.lock().await;
        let window_start = now - self.window;

        hits.calls += 1;
        if hits.calls % self.prune_every == 0 {
            hits.by_key
                .retain(|_, times| times.back().map_or(false, |last| *last > window_start));
        }

        let times = hits.by_key.entry(key.to_string()).or_default();
        while times.front().map_or(false, |first| *first <= window_start) {
            times.pop_front();
        }

        if times.len() >= self.limit as usize {
            let oldest = times.front().copied().unwrap_or(now);
            let wait = (oldest + self.window - now).num_milliseconds().max(0);
            let retry_after_seconds = ((wait + 999) / 1000).max(1) as u64;
            return Ok(RateDecision::Limited { retry_after_seconds });
        }

        times.push_back(now);
        Ok(RateDecision::Allowed)
    }
}
