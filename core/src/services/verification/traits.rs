//! Traits for notifier and rate limiter integration

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::Delivery;

/// Delivery channel for verification tokens (e-mail, SMS)
///
/// The engine calls it and bounds the call with a timeout; it never
/// implements delivery itself.
#[async_trait]
pub trait VerificationNotifier: Send + Sync {
    /// Deliver the token to the subject, returning a provider message id
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String>;

    /// Short channel name used in logs
    fn channel_name(&self) -> &str;
}

/// Outcome of an issuance rate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_seconds: u64 },
}

/// Rate rule for issuance per subject and purpose
#[async_trait]
pub trait IssueRateLimiter: Send + Sync {
    /// Check the rule for `key` at `now` and count the issuance when allowed
    async fn check_and_record(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, String>;
}
