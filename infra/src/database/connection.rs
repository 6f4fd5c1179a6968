//! MySQL connection pool built from `DatabaseConfig`

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};
use vt_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Snapshot of pool usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatistics {
    /// Open connections
    pub connections: u32,
    /// Open connections not currently in use
    pub idle_connections: u32,
    /// Configured upper bound
    pub max_connections: u32,
}

impl fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

/// Wrapper around the SQLx MySQL pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Connect a new pool
    ///
    /// # Arguments
    ///
    /// * `config` - Connection URL, pool size and timeouts
    ///
    /// # Returns
    ///
    /// * `Ok(DatabasePool)` - The pool established at least one connection
    /// * `Err(InfrastructureError::Config)` - The URL is not a MySQL URL
    /// * `Err(InfrastructureError::Database)` - The database could not be reached
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        validate_url(&config.url)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect(&config.url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to connect to MySQL");
                InfrastructureError::Database(e)
            })?;

        info!(
            max_connections = config.max_connections,
            "MySQL connection pool established"
        );

        Ok(Self { pool, config })
    }

    /// Underlying SQLx pool
    pub fn inner(&self) -> &MySqlPool {
        &self.pool
    }

    /// Run a trivial query against the database
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }

    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            max_connections: self.config.max_connections,
        }
    }

    /// Close all connections
    pub async fn close(&self) {
        self.pool.close().await;
        info!("MySQL connection pool closed");
    }
}

pub(crate) fn validate_url(url: &str) -> Result<(), InfrastructureError> {
    if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        return Ok(());
    }
    Err(InfrastructureError::Config(format!(
        "DATABASE_URL must be a mysql:// URL, got scheme '{}'",
        url.split("://").next().unwrap_or_default()
    )))
}
