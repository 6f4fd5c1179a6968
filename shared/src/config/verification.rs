//! Verification lifecycle configuration
//!
//! Default TTL per purpose, attempt limits, delivery timeout, store retry
//! policy and issuance rate limits. Loaded once at startup and never mutated.

use serde::{Deserialize, Serialize};

use super::env_parse;

/// Upper bound accepted for `max_ttl_seconds` (one year)
pub const MAX_TTL_CEILING_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Default token lifetime per purpose, in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PurposeTtlConfig {
    /// E-mail address confirmation
    pub email_confirm: u64,
    /// Phone number confirmation
    pub phone_confirm: u64,
    /// Password reset
    pub password_reset: u64,
    /// Confirmation of a pending account action
    pub account_action: u64,
}

impl Default for PurposeTtlConfig {
    fn default() -> Self {
        Self {
            email_confirm: 15 * 60,
            phone_confirm: 10 * 60,
            password_reset: 30 * 60,
            account_action: 15 * 60,
        }
    }
}

impl PurposeTtlConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            email_confirm: env_parse("VERIFICATION_TTL_EMAIL_CONFIRM", defaults.email_confirm),
            phone_confirm: env_parse("VERIFICATION_TTL_PHONE_CONFIRM", defaults.phone_confirm),
            password_reset: env_parse("VERIFICATION_TTL_PASSWORD_RESET", defaults.password_reset),
            account_action: env_parse("VERIFICATION_TTL_ACCOUNT_ACTION", defaults.account_action),
        }
    }

    /// Largest configured default
    pub fn max(&self) -> u64 {
        self.email_confirm
            .max(self.phone_confirm)
            .max(self.password_reset)
            .max(self.account_action)
    }
}

/// Verification engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Default TTL per purpose
    #[serde(default)]
    pub ttl: PurposeTtlConfig,

    /// Upper bound for caller supplied TTL overrides, in seconds
    pub max_ttl_seconds: u64,

    /// Failed confirmations allowed before the request is revoked
    pub max_attempts: u32,

    /// Bound on a single notifier call, in milliseconds
    pub delivery_timeout_ms: u64,

    /// Total attempts for a store call that reports unavailability
    pub store_retry_attempts: u32,

    /// Base delay between store retries, in milliseconds
    pub store_retry_delay_ms: u64,

    /// Issuances allowed per subject and purpose within the window (0 disables)
    pub issue_limit: u32,

    /// Rate limit window in seconds
    pub issue_window_seconds: u64,

    /// Revoke older pending requests of the same subject and purpose on issue
    #[serde(default)]
    pub supersede_pending: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            ttl: PurposeTtlConfig::default(),
            max_ttl_seconds: 24 * 60 * 60,
            max_attempts: 5,
            delivery_timeout_ms: 10_000,
            store_retry_attempts: 3,
            store_retry_delay_ms: 50,
            issue_limit: 5,
            issue_window_seconds: 60 * 60,
            supersede_pending: false,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: PurposeTtlConfig::from_env(),
            max_ttl_seconds: env_parse("VERIFICATION_MAX_TTL_SECONDS", defaults.max_ttl_seconds),
            max_attempts: env_parse("VERIFICATION_MAX_ATTEMPTS", defaults.max_attempts),
            delivery_timeout_ms: env_parse("VERIFICATION_DELIVERY_TIMEOUT_MS", defaults.delivery_timeout_ms),
            store_retry_attempts: env_parse("VERIFICATION_STORE_RETRY_ATTEMPTS", defaults.store_retry_attempts),
            store_retry_delay_ms: env_parse("VERIFICATION_STORE_RETRY_DELAY_MS", defaults.store_retry_delay_ms),
            issue_limit: env_parse("VERIFICATION_ISSUE_LIMIT", defaults.issue_limit),
            issue_window_seconds: env_parse("VERIFICATION_ISSUE_WINDOW_SECONDS", defaults.issue_window_seconds),
            supersede_pending: env_parse("VERIFICATION_SUPERSEDE_PENDING", defaults.supersede_pending),
        }
    }
}

/// Expiry sweep and retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Whether the background sweep runs at all
    pub enabled: bool,

    /// Seconds between sweep cycles
    pub interval_seconds: u64,

    /// Records handled per store call
    pub batch_size: usize,

    /// How long terminal records are kept after `expires_at`, in seconds
    pub retention_seconds: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            batch_size: 500,
            retention_seconds: 7 * 24 * 60 * 60,
        }
    }
}

impl SweepConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("SWEEP_ENABLED", defaults.enabled),
            interval_seconds: env_parse("SWEEP_INTERVAL_SECONDS", defaults.interval_seconds),
            batch_size: env_parse("SWEEP_BATCH_SIZE", defaults.batch_size),
            retention_seconds: env_parse("SWEEP_RETENTION_SECONDS", defaults.retention_seconds),
        }
    }
}
