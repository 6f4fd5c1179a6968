//! Shared utilities and common types for the verification service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types, loaded once from the environment at process start
//! - Error response structure and stable error codes
//! - Log masking helpers for subject identifiers and destinations

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LoggingConfig, LogFormat,
    CacheConfig, DatabaseConfig, StoreBackend, ServerConfig,
    VerificationConfig, PurposeTtlConfig, SweepConfig,
    SigningConfig, NotifierConfig, EmailConfig, SmsConfig,
};
pub use errors::{ErrorResponse, ConfigError, error_codes};
pub use utils::mask::mask_destination;
