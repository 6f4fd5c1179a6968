//! Redis client with a shared, self-reconnecting connection

use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::{error, info};
use vt_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Redis client wrapper
///
/// Cloning is cheap; all clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let client = redis::Client::open(config.url.as_str())?;
        let manager = tokio::time::timeout(
            Duration::from_secs(config.response_timeout.max(1)),
            client.get_connection_manager(),
        )
        .await
        .map_err(|_| InfrastructureError::Config(format!("Timed out connecting to Redis at {}", config.url)))?
        .map_err(|e| {
            error!(error = %e, "Failed to connect to Redis");
            InfrastructureError::Cache(e)
        })?;

        info!("Redis connection established");
        Ok(Self { manager, config })
    }

    /// A handle to the shared connection
    pub fn get_connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Apply the configured key prefix
    pub fn key(&self, key: &str) -> String {
        self.config.key(key)
    }

    /// Bound on a single Redis round trip
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.config.response_timeout.max(1))
    }

    /// Check that Redis answers
    pub async fn ping(&self) -> Result<(), InfrastructureError> {
        let mut conn = self.get_connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
