//! Configuration for the verification engine

use chrono::Duration;
use vt_shared::config::VerificationConfig;

use crate::domain::entities::Purpose;

/// Configuration for the verification engine
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Default lifetime of an e-mail confirmation token
    pub email_confirm_ttl: Duration,
    /// Default lifetime of a phone confirmation token
    pub phone_confirm_ttl: Duration,
    /// Default lifetime of a password reset token
    pub password_reset_ttl: Duration,
    /// Default lifetime of an account action token
    pub account_action_ttl: Duration,
    /// Upper bound for caller supplied TTLs
    pub max_ttl: Duration,
    /// Failed confirmations after which the request is revoked
    pub max_attempts: u32,
    /// Bound on a single notifier call
    pub delivery_timeout: std::time::Duration,
    /// Total attempts for store calls that report unavailability
    pub store_retry_attempts: u32,
    /// Base delay between store retries, multiplied by the attempt number
    pub store_retry_delay: std::time::Duration,
    /// Issuances allowed per subject and purpose within `issue_window` (0 disables)
    pub issue_limit: u32,
    /// Rate limit window
    pub issue_window: Duration,
    /// Revoke older pending requests of the same subject and purpose on issue
    pub supersede_pending: bool,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            email_confirm_ttl: seconds(config.ttl.email_confirm),
            phone_confirm_ttl: seconds(config.ttl.phone_confirm),
            password_reset_ttl: seconds(config.ttl.password_reset),
            account_action_ttl: seconds(config.ttl.account_action),
            max_ttl: seconds(config.max_ttl_seconds),
            max_attempts: config.max_attempts.max(1),
            delivery_timeout: std::time::Duration::from_millis(config.delivery_timeout_ms),
            store_retry_attempts: config.store_retry_attempts.max(1),
            store_retry_delay: std::time::Duration::from_millis(config.store_retry_delay_ms),
            issue_limit: config.issue_limit,
            issue_window: seconds(config.issue_window_seconds),
            supersede_pending: config.supersede_pending,
        }
    }
}

impl VerificationServiceConfig {
    /// Default TTL for a purpose
    pub fn default_ttl(&self, purpose: Purpose) -> Duration {
        match purpose {
            Purpose::EmailConfirm => self.email_confirm_ttl,
            Purpose::PhoneConfirm => self.phone_confirm_ttl,
            Purpose::PasswordReset => self.password_reset_ttl,
            Purpose::AccountAction => self.account_action_ttl,
        }
    }
}

// chrono panics on durations past about 292 million years
const MAX_CONFIG_SECONDS: i64 = i64::MAX / 1_000_000;

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(MAX_CONFIG_SECONDS).min(MAX_CONFIG_SECONDS))
}
