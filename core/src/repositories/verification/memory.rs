//! In-process verification store
//!
//! Every operation runs under one `RwLock`, which makes each of them atomic.
//! Suitable for single-instance deployments and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Purpose, VerificationRequest, VerificationState};
use crate::errors::StoreError;

use super::r#trait::{apply_transition, check_transition, StateMutator, VerificationStore};

/// Verification store backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryVerificationStore {
    records: Arc<RwLock<HashMap<Uuid, VerificationRequest>>>,
}

impl InMemoryVerificationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, terminal ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(&request.id) {
            return Err(StoreError::DuplicateId { id: request.id });
        }

        records.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError> {
        let records = self.records.read().await;
        records.get(&id).cloned().ok_or(StoreError::NotFound { id })
    }

    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        check_transition(expected, new_state)?;

        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound { id })?;

        if record.state != expected {
            return Err(StoreError::StateConflict {
                current: record.state,
            });
        }

        let next = apply_transition(record, new_state, mutator);
        *record = next.clone();
        Ok(next)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError> {
        let mut records = self.records.write().await;

        let mut due: Vec<(DateTime<Utc>, Uuid)> = records
            .values()
            .filter(|r| r.is_pending() && r.is_expired_at(now))
            .map(|r| (r.expires_at, r.id))
            .collect();
        due.sort();
        due.truncate(limit);

        let mut expired = Vec::with_capacity(due.len());
        for (_, id) in due {
            if let Some(record) = records.get_mut(&id) {
                record.state = VerificationState::Expired;
                record.finalized_at = Some(now);
                expired.push(id);
            }
        }
        Ok(expired)
    }

    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;

        let doomed: Vec<Uuid> = records
            .values()
            .filter(|r| r.state.is_terminal() && r.expires_at < cutoff)
            .map(|r| r.id)
            .take(limit)
            .collect();

        for id in &doomed {
            records.remove(id);
        }
        Ok(doomed.len())
    }

    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.is_pending() && r.subject_id == subject_id && r.purpose == purpose)
            .map(|r| r.id)
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
