//! Expiry sweeper for periodic maintenance of verification requests
//!
//! The sweep may run concurrently with confirmations. Both go through the
//! store's conditional transition, so whichever lands first wins and the
//! other observes the terminal state.

use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;
use vt_shared::config::SweepConfig;

use crate::clock::{Clock, SystemClock};
use crate::errors::StoreError;
use crate::repositories::VerificationStore;

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct ExpirySweepConfig {
    /// Whether the background task runs
    pub enabled: bool,
    /// Time between sweep cycles
    pub interval: std::time::Duration,
    /// Records handled per store call
    pub batch_size: usize,
    /// How long terminal records are kept past `expires_at`
    pub retention: Duration,
}

impl Default for ExpirySweepConfig {
    fn default() -> Self {
        Self::from(&SweepConfig::default())
    }
}

impl From<&SweepConfig> for ExpirySweepConfig {
    fn from(config: &SweepConfig) -> Self {
        Self {
            enabled: config.enabled,
            interval: std::time::Duration::from_secs(config.interval_seconds.max(1)),
            batch_size: config.batch_size.max(1),
            retention: Duration::seconds(i64::try_from(config.retention_seconds).unwrap_or(i64::MAX / 1_000_000)),
        }
    }
}

/// Service expiring stale pending requests and reaping old terminal ones
pub struct ExpirySweeper<S: VerificationStore + 'static> {
    store: Arc<S>,
    config: ExpirySweepConfig,
    clock: Arc<dyn Clock>,
}

impl<S: VerificationStore + 'static> ExpirySweeper<S> {
    /// Create a new sweeper
    pub fn new(store: Arc<S>, config: ExpirySweepConfig) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lazily expire every request that is due at `now`
    ///
    /// Each poll that exhausts the current page asks the store for the next
    /// batch, so dropping the stream stops the sweep between batches. A batch
    /// can come back short when a confirmation wins the race for some of its
    /// rows, so only an empty batch ends the stream. Every non-empty batch
    /// moves at least one record out of Pending, which keeps the stream finite.
    pub fn expired_ids(&self, now: DateTime<Utc>) -> impl Stream<Item = Result<Uuid, StoreError>> + '_ {
        let batch_size = self.config.batch_size.max(1);

        stream::try_unfold((), move |()| async move {
            let batch = self.store.sweep_expired(now, batch_size).await?;
            if batch.is_empty() {
                return Ok::<_, StoreError>(None);
            }
            Ok(Some((stream::iter(batch.into_iter().map(Ok::<Uuid, StoreError>)), ())))
        })
        .try_flatten()
    }

    /// Run a single sweep cycle
    ///
    /// This method performs the following tasks:
    /// 1. Expire pending requests past `expires_at`
    /// 2. Delete terminal requests whose `expires_at` is older than the retention window
    ///
    /// Errors are collected in the result rather than aborting the cycle.
    pub async fn run_once(&self) -> SweepResult {
        let now = self.clock.now();
        let mut result = SweepResult::default();

        let mut expired = Box::pin(self.expired_ids(now));
        while let Some(item) = expired.next().await {
            match item {
                Ok(_) => result.expired += 1,
                Err(e) => {
                    error!(error = %e, event = "sweep_expire_failed", "Failed to expire verification requests");
                    result.errors.push(format!("Expire error: {}", e));
                    break;
                }
            }
        }

        let cutoff = now - self.config.retention;
        let batch_size = self.config.batch_size.max(1);
        loop {
            match self.store.reap(cutoff, batch_size).await {
                Ok(count) => {
                    result.reaped += count;
                    if count < batch_size {
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, event = "sweep_reap_failed", "Failed to reap verification requests");
                    result.errors.push(format!("Reap error: {}", e));
                    break;
                }
            }
        }

        info!(
            expired = result.expired,
            reaped = result.reaped,
            errors = result.errors.len(),
            event = "sweep_completed",
            "Verification sweep completed"
        );
        result
    }

    /// Start the sweeper as a background task
    ///
    /// Spawns a tokio task that runs a cycle every `interval`. Returns `None`
    /// when the sweep is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Verification sweep is disabled");
            return None;
        }

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval.as_secs(),
                batch_size = self.config.batch_size,
                "Verification sweep started"
            );

            let mut timer = tokio::time::interval(self.config.interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                timer.tick().await;
                let result = self.run_once().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "Sweep completed with errors");
                }
            }
        }))
    }
}

/// Result of a sweep cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Pending requests moved to Expired
    pub expired: usize,
    /// Terminal requests deleted
    pub reaped: usize,
    /// Errors encountered during the cycle
    pub errors: Vec<String>,
}

impl SweepResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
