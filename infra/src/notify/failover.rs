//! Failover notifier
//!
//! Delivers through a primary channel and switches to a backup when the
//! primary fails. The primary is tried again once `failover_timeout` has
//! passed since its last failure.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use vt_core::{Delivery, VerificationNotifier};

/// State tracking for failover
#[derive(Debug, Clone, Default)]
pub(crate) struct FailoverState {
    /// Whether deliveries currently go to the backup
    pub using_backup: bool,
    /// When the primary last failed
    pub last_primary_failure: Option<Instant>,
    /// Consecutive primary failures
    pub primary_failure_count: u32,
}

/// Notifier with automatic failover between two channels
pub struct FailoverNotifier {
    primary: Arc<dyn VerificationNotifier>,
    backup: Arc<dyn VerificationNotifier>,
    pub(crate) state: Arc<RwLock<FailoverState>>,
    failover_timeout: Duration,
}

impl FailoverNotifier {
    /// Create a new failover notifier
    ///
    /// # Arguments
    ///
    /// * `primary` - Channel used while healthy
    /// * `backup` - Channel used after the primary fails
    /// * `failover_timeout` - How long to stay on the backup before retrying the primary
    pub fn new(
        primary: Arc<dyn VerificationNotifier>,
        backup: Arc<dyn VerificationNotifier>,
        failover_timeout: Duration,
    ) -> Self {
        info!(
            primary = primary.channel_name(),
            backup = backup.channel_name(),
            "Initializing failover notifier"
        );

        Self {
            primary,
            backup,
            state: Arc::new(RwLock::new(FailoverState::default())),
            failover_timeout,
        }
    }

    /// Whether deliveries currently go to the backup
    pub async fn is_using_backup(&self) -> bool {
        self.state.read().await.using_backup
    }

    async fn should_try_primary(&self) -> bool {
        let state = self.state.read().await;
        if !state.using_backup {
            return true;
        }
        state
            .last_primary_failure
            .map_or(true, |failed_at| failed_at.elapsed() > self.failover_timeout)
    }

    async fn record_primary_failure(&self) {
        let mut state = self.state.write().await;
        state.primary_failure_count += 1;
        state.last_primary_failure = Some(Instant::now());

        if !state.using_backup {
            warn!(
                primary = self.primary.channel_name(),
                backup = self.backup.channel_name(),
                "Primary notifier failed, switching to backup"
            );
            state.using_backup = true;
        }
    }

    async fn record_primary_success(&self) {
        let mut state = self.state.write().await;
        if state.using_backup {
            info!(primary = self.primary.channel_name(), "Primary notifier recovered");
        }
        *state = FailoverState::default();
    }
}

#[async_trait]
impl VerificationNotifier for FailoverNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        let tried_primary = self.should_try_primary().await;
        if tried_primary {
            match self.primary.deliver(delivery).await {
                Ok(message_id) => {
                    self.record_primary_success().await;
                    return Ok(message_id);
                }
                Err(e) => {
                    error!(channel = self.primary.channel_name(), error = %e, "Primary notifier failed");
                    self.record_primary_failure().await;
                }
            }
        }

        self.backup.deliver(delivery).await.map_err(|e| {
            error!(channel = self.backup.channel_name(), tried_primary, error = %e, "Backup notifier failed");
            if tried_primary {
                format!(
                    "Both primary ({}) and backup ({}) notifiers failed: {}",
                    self.primary.channel_name(),
                    self.backup.channel_name(),
                    e
                )
            } else {
                format!(
                    "Backup notifier ({}) failed while primary ({}) is in failover: {}",
                    self.backup.channel_name(),
                    self.primary.channel_name(),
                    e
                )
            }
        })
    }

    fn channel_name(&self) -> &str {
        "failover"
    }
}
