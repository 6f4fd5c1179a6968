//! Verification engine module
//!
//! This module provides the verification-token lifecycle:
//! - Issuance with per-purpose TTLs, rate limiting and bounded delivery
//! - Confirmation with constant-time secret checks and attempt tracking
//! - Revocation, explicit reissue and status lookups
//! - Traits for the notifier gateway and the issuance rate limiter

mod config;
mod rate_limiter;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use rate_limiter::InMemoryIssueRateLimiter;
pub use service::VerificationEngine;
pub use traits::{IssueRateLimiter, RateDecision, VerificationNotifier};
pub use types::{ConfirmOutcome, Delivery, IssueOutcome, IssueRequest, RevokeOutcome};
