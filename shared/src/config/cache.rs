//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::env_parse;

/// Redis configuration backing the shared issuance rate limiter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Use Redis for issuance rate limiting instead of the process-local limiter
    #[serde(default)]
    pub enabled: bool,

    /// Redis connection URL
    pub url: String,

    /// Response timeout in seconds
    pub response_timeout: u64,

    /// Prefix prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::from("redis://localhost:6379"),
            response_timeout: 5,
            key_prefix: Some(String::from("vt")),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("REDIS_ENABLED", defaults.enabled),
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            response_timeout: env_parse("REDIS_RESPONSE_TIMEOUT", defaults.response_timeout),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").ok().or(defaults.key_prefix),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Apply the configured prefix to a key
    pub fn key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, key),
            _ => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix() {
        let config = CacheConfig::new("redis://cache:6379");
        assert_eq!(config.key("issue:user-1"), "vt:issue:user-1");

        let bare = CacheConfig {
            key_prefix: None,
            ..config
        };
        assert_eq!(bare.key("issue:user-1"), "issue:user-1");
    }
}
