//! # Infrastructure Layer
//!
//! Concrete implementations of the interfaces defined in `vt_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL `VerificationStore` using SQLx with optimistic conditional updates
//! - **Cache**: Redis client and the shared issuance rate limiter
//! - **Notify**: Delivery channels for verification tokens (mock, HTTP e-mail API, Twilio SMS)
//!   plus failover and purpose-based routing
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL store (default)
//! - `redis-cache`: Enable the Redis rate limiter (default)
//! - `twilio-sms`: Enable the Twilio SMS channel

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and rate limiting
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Notifier gateways
pub mod notify;

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlVerificationStore, PoolStatistics};

#[cfg(feature = "redis-cache")]
pub use cache::{RedisClient, RedisIssueRateLimiter};

pub use notify::{
    create_notifier, FailoverNotifier, HttpEmailNotifier, MockNotifier, NotifierRouter,
};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
