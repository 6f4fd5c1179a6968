//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection for the shared issuance rate limiter
//! - `database` - Store backend selection and MySQL pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `notifier` - E-mail and SMS delivery channels
//! - `server` - HTTP server configuration
//! - `signing` - Token signing key ring
//! - `verification` - Token lifetimes, attempt limits, retry policy and sweep
//!
//! Configuration is read once at process start and shared immutably afterwards.

pub mod cache;
pub mod database;
pub mod environment;
pub mod notifier;
pub mod server;
pub mod signing;
pub mod verification;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::{DatabaseConfig, StoreBackend};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use notifier::{EmailConfig, NotifierConfig, SmsConfig};
pub use server::ServerConfig;
pub use signing::{SigningConfig, MIN_SIGNING_KEY_LENGTH};
pub use verification::{PurposeTtlConfig, SweepConfig, VerificationConfig, MAX_TTL_CEILING_SECONDS};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database / store configuration
    pub database: DatabaseConfig,

    /// Verification lifecycle configuration
    pub verification: VerificationConfig,

    /// Token signing configuration
    pub signing: SigningConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Expiry sweep configuration
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Delivery channels
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            verification: VerificationConfig::default(),
            signing: SigningConfig::default(),
            cache: CacheConfig::default(),
            sweep: SweepConfig::default(),
            notifier: NotifierConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            verification: VerificationConfig::from_env(),
            signing: SigningConfig::from_env(),
            cache: CacheConfig::from_env(),
            sweep: SweepConfig::from_env(),
            notifier: NotifierConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Check the configuration once before anything is built from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.signing.is_using_default_key() {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_SIGNING_KEY".to_string(),
                reason: "the development signing key must not be used in production".to_string(),
            });
        }

        let short_key = std::iter::once((&self.signing.active_key_id, &self.signing.active_key))
            .chain(self.signing.retired_keys.iter())
            .find(|(_, key)| key.len() < MIN_SIGNING_KEY_LENGTH);
        if let Some((key_id, _)) = short_key {
            return Err(ConfigError::Invalid {
                key: format!("signing key '{}'", key_id),
                reason: format!("must be at least {} bytes", MIN_SIGNING_KEY_LENGTH),
            });
        }

        if self.verification.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_MAX_ATTEMPTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.verification.max_ttl_seconds > MAX_TTL_CEILING_SECONDS {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_MAX_TTL_SECONDS".to_string(),
                reason: format!("must not exceed {} seconds", MAX_TTL_CEILING_SECONDS),
            });
        }

        if self.verification.ttl.max() > self.verification.max_ttl_seconds {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_MAX_TTL_SECONDS".to_string(),
                reason: "a default purpose TTL exceeds the maximum TTL".to_string(),
            });
        }

        if self.sweep.enabled && (self.sweep.interval_seconds == 0 || self.sweep.batch_size == 0) {
            return Err(ConfigError::Invalid {
                key: "SWEEP_INTERVAL_SECONDS / SWEEP_BATCH_SIZE".to_string(),
                reason: "must be positive when the sweep is enabled".to_string(),
            });
        }

        Ok(())
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
