//! Mock implementations for testing the verification engine

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vt_shared::config::SigningConfig;

use crate::clock::ManualClock;
use crate::domain::entities::{Purpose, VerificationRequest, VerificationState};
use crate::errors::StoreError;
use crate::repositories::{InMemoryVerificationStore, StateMutator, VerificationStore};
use crate::services::codec::TokenCodec;
use crate::services::verification::{Delivery, VerificationEngine, VerificationNotifier, VerificationServiceConfig};

// Mock notifier recording every delivery attempt
pub struct MockNotifier {
    pub deliveries: Arc<Mutex<Vec<Delivery>>>,
    pub should_fail: bool,
    pub delay: Option<std::time::Duration>,
}

impl MockNotifier {
    pub fn new(should_fail: bool) -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(Vec::new())),
            should_fail,
            delay: None,
        }
    }

    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(false)
        }
    }

    pub fn last_delivery(&self) -> Option<Delivery> {
        self.deliveries.lock().unwrap().last().cloned()
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_delivery().map(|d| d.token)
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl VerificationNotifier for MockNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        self.deliveries.lock().unwrap().push(delivery.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err("Notifier service error".to_string());
        }
        Ok(format!("mock-msg-{}", Uuid::new_v4()))
    }

    fn channel_name(&self) -> &str {
        "mock"
    }
}

// Store wrapper that fails a scripted number of calls
pub struct ScriptedStore {
    pub inner: InMemoryVerificationStore,
    unavailable_failures: AtomicU32,
    duplicate_failures: AtomicU32,
    lost_acks: AtomicU32,
    pub create_calls: AtomicU32,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVerificationStore::new(),
            unavailable_failures: AtomicU32::new(0),
            duplicate_failures: AtomicU32::new(0),
            lost_acks: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
        }
    }

    /// Fail the next `count` calls with `Unavailable`
    pub fn fail_unavailable(self, count: u32) -> Self {
        self.unavailable_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail the next `count` creates with `DuplicateId`
    pub fn fail_duplicate(self, count: u32) -> Self {
        self.duplicate_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Persist the next `count` creates but report them as `Unavailable`
    pub fn lose_create_acks(self, count: u32) -> Self {
        self.lost_acks.store(count, Ordering::SeqCst);
        self
    }

    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if Self::take(&self.unavailable_failures) {
            return Err(StoreError::Unavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for ScriptedStore {
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if Self::take(&self.duplicate_failures) {
            return Err(StoreError::DuplicateId { id: request.id });
        }
        if Self::take(&self.lost_acks) {
            self.inner.create(request).await?;
            return Err(StoreError::Unavailable {
                message: "connection reset after commit".to_string(),
            });
        }
        self.inner.create(request).await
    }

    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError> {
        self.check_available()?;
        self.inner.get(id).await
    }

    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        self.check_available()?;
        self.inner.compare_and_transition(id, expected, new_state, mutator).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        self.inner.sweep_expired(now, limit).await
    }

    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        self.check_available()?;
        self.inner.reap(cutoff, limit).await
    }

    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        self.inner.find_pending(subject_id, purpose).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

pub const TEST_SIGNING_KEY: &str = "unit-test-signing-key-0123456789abcdef";

pub fn test_codec() -> TokenCodec {
    TokenCodec::from_config(&SigningConfig::new("test", TEST_SIGNING_KEY)).unwrap()
}

pub fn test_config() -> VerificationServiceConfig {
    VerificationServiceConfig {
        max_attempts: 3,
        delivery_timeout: std::time::Duration::from_millis(200),
        store_retry_attempts: 3,
        store_retry_delay: std::time::Duration::from_millis(1),
        issue_limit: 0,
        ..VerificationServiceConfig::default()
    }
}

/// Engine over `store` with a manual clock
pub fn engine_with<S: VerificationStore>(
    store: Arc<S>,
    config: VerificationServiceConfig,
) -> (VerificationEngine<S>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = VerificationEngine::new(store, test_codec(), config).with_clock(clock.clone());
    (engine, clock)
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}
