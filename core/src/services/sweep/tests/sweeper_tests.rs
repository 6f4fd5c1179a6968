//! Unit tests for the expiry sweeper

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures_util::TryStreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::{Purpose, VerificationRequest, VerificationState};
use crate::errors::StoreError;
use crate::repositories::{InMemoryVerificationStore, StateMutator, VerificationStore};
use crate::services::sweep::{ExpirySweepConfig, ExpirySweeper};

fn config(batch_size: usize) -> ExpirySweepConfig {
    ExpirySweepConfig {
        enabled: true,
        interval: std::time::Duration::from_millis(10),
        batch_size,
        retention: Duration::days(7),
    }
}

async fn seed(store: &InMemoryVerificationStore, clock: &ManualClock, ttl: Duration) -> Uuid {
    let now = clock.now();
    let request = VerificationRequest::new(
        Uuid::new_v4(),
        "user-1",
        Purpose::EmailConfirm,
        "0".repeat(64),
        now,
        now + ttl,
    );
    let id = request.id;
    store.create(request).await.unwrap();
    id
}

/// Store where a confirmation lands between the sweep's select and its
/// update on the first batch, so that batch comes back one short
struct ConfirmRacingStore {
    inner: InMemoryVerificationStore,
    raced: AtomicBool,
}

#[async_trait]
impl VerificationStore for ConfirmRacingStore {
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError> {
        self.inner.create(request).await
    }

    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError> {
        self.inner.get(id).await
    }

    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        self.inner.compare_and_transition(id, expected, new_state, mutator).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let pending = self.inner.find_pending("user-1", Purpose::EmailConfirm).await?;
            if let Some(id) = pending.first() {
                self.inner
                    .compare_and_transition(*id, VerificationState::Pending, VerificationState::Verified, &|_| {})
                    .await?;
                return self.inner.sweep_expired(now, limit - 1).await;
            }
        }
        self.inner.sweep_expired(now, limit).await
    }

    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        self.inner.reap(cutoff, limit).await
    }

    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError> {
        self.inner.find_pending(subject_id, purpose).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_run_once_expires_due_requests_in_batches() {
    let store = Arc::new(InMemoryVerificationStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let sweeper = ExpirySweeper::new(store.clone(), config(2)).with_clock(clock.clone());

    let mut due = Vec::new();
    for _ in 0..5 {
        due.push(seed(&store, &clock, Duration::minutes(1)).await);
    }
    let live = seed(&store, &clock, Duration::hours(1)).await;

    clock.advance(Duration::minutes(2));
    let result = sweeper.run_once().await;

    assert_eq!(result.expired, 5);
    assert_eq!(result.reaped, 0);
    assert!(result.is_success());
    for id in due {
        assert_eq!(store.get(id).await.unwrap().state, VerificationState::Expired);
    }
    assert_eq!(store.get(live).await.unwrap().state, VerificationState::Pending);

    // Nothing left to do on the next cycle
    assert_eq!(sweeper.run_once().await.expired, 0);
}

#[tokio::test]
async fn test_run_once_reaps_after_retention() {
    let store = Arc::new(InMemoryVerificationStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let sweeper = ExpirySweeper::new(store.clone(), config(10)).with_clock(clock.clone());

    let id = seed(&store, &clock, Duration::minutes(1)).await;
    clock.advance(Duration::minutes(2));
    assert_eq!(sweeper.run_once().await.expired, 1);

    clock.advance(Duration::days(6));
    assert_eq!(sweeper.run_once().await.reaped, 0);
    assert!(store.get(id).await.is_ok());

    clock.advance(Duration::days(2));
    assert_eq!(sweeper.run_once().await.reaped, 1);
    assert_eq!(store.get(id).await, Err(StoreError::NotFound { id }));
}

#[tokio::test]
async fn test_expired_ids_stream_is_lazy_and_finite() {
    let store = Arc::new(InMemoryVerificationStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let sweeper = ExpirySweeper::new(store.clone(), config(3)).with_clock(clock.clone());

    for _ in 0..7 {
        seed(&store, &clock, Duration::seconds(1)).await;
    }
    clock.advance(Duration::seconds(5));

    // Creating the stream does not touch the store
    let stream = sweeper.expired_ids(clock.now());
    let pending = store.find_pending("user-1", Purpose::EmailConfirm).await.unwrap();
    assert_eq!(pending.len(), 7);

    let ids: Vec<Uuid> = stream.try_collect().await.unwrap();
    assert_eq!(ids.len(), 7);

    let again: Vec<Uuid> = sweeper.expired_ids(clock.now()).try_collect().await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_disabled_sweeper_does_not_start() {
    let store = Arc::new(InMemoryVerificationStore::new());
    let sweeper = Arc::new(ExpirySweeper::new(
        store,
        ExpirySweepConfig {
            enabled: false,
            ..config(10)
        },
    ));

    assert!(sweeper.start_background_task().is_none());
}

#[tokio::test]
async fn test_background_task_sweeps_on_interval() {
    let store = Arc::new(InMemoryVerificationStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let id = seed(&store, &clock, Duration::seconds(1)).await;
    clock.advance(Duration::seconds(2));

    let sweeper = Arc::new(ExpirySweeper::new(store.clone(), config(10)).with_clock(clock.clone()));
    let handle = sweeper.start_background_task().unwrap();

    let mut state = VerificationState::Pending;
    for _ in 0..100 {
        state = store.get(id).await.unwrap().state;
        if state == VerificationState::Expired {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    handle.abort();

    assert_eq!(state, VerificationState::Expired);
}

#[tokio::test]
async fn test_short_batch_from_a_racing_confirmation_does_not_end_the_sweep() {
    let store = Arc::new(ConfirmRacingStore {
        inner: InMemoryVerificationStore::new(),
        raced: AtomicBool::new(false),
    });
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let sweeper = ExpirySweeper::new(store.clone(), config(3)).with_clock(clock.clone());

    for _ in 0..6 {
        seed(&store.inner, &clock, Duration::seconds(1)).await;
    }
    clock.advance(Duration::seconds(5));

    let result = sweeper.run_once().await;

    assert!(result.is_success());
    assert_eq!(result.expired, 5);
    let pending = store.inner.find_pending("user-1", Purpose::EmailConfirm).await.unwrap();
    assert!(pending.is_empty());
}
