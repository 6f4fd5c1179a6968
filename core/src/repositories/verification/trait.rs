//! Store contract for verification request persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Purpose, VerificationRequest, VerificationState};
use crate::errors::StoreError;

/// Edits applied to a record as part of a state transition
///
/// Only `attempts` and `finalized_at` survive; identity fields are restored
/// by [`apply_transition`] afterwards.
pub type StateMutator<'a> = &'a (dyn Fn(&mut VerificationRequest) + Send + Sync);

/// Repository trait for verification request persistence
///
/// This trait is the single point of mutation for verification requests.
/// Every state change goes through [`VerificationStore::compare_and_transition`],
/// which must be atomic with respect to concurrent callers on the same id.
///
/// # Concurrency
/// - Implementations use a conditional update on the expected state rather
///   than a lock held across calls, so a lost race is reported as
///   `StateConflict` instead of blocking.
/// - Operations on different ids never coordinate.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Persist a new request
    ///
    /// # Returns
    /// * `Ok(())` - Request stored
    /// * `Err(StoreError::DuplicateId)` - A request with the same id exists
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError>;

    /// Fetch a request by id
    ///
    /// # Returns
    /// * `Ok(VerificationRequest)` - Request found
    /// * `Err(StoreError::NotFound)` - No request with this id (or already reaped)
    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError>;

    /// Atomically move a request from `expected` to `new_state`
    ///
    /// # Arguments
    /// * `id` - Request id
    /// * `expected` - State the caller observed
    /// * `new_state` - State to move to
    /// * `mutator` - Edits to `attempts` / `finalized_at` applied in the same step
    ///
    /// # Returns
    /// * `Ok(VerificationRequest)` - The record as committed
    /// * `Err(StoreError::StateConflict)` - The current state is not `expected`
    /// * `Err(StoreError::InvalidTransition)` - `expected -> new_state` is not legal
    /// * `Err(StoreError::NotFound)` - No request with this id
    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError>;

    /// Expire at most `limit` pending requests whose `expires_at` is before `now`
    ///
    /// Safe to call repeatedly; an id is reported only by the call that
    /// expired it.
    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError>;

    /// Delete at most `limit` terminal requests whose `expires_at` is before `cutoff`
    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError>;

    /// Ids of pending requests for a subject and purpose
    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError>;

    /// Check that the backing storage answers
    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: VerificationStore + ?Sized> VerificationStore for Arc<S> {
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError> {
        (**self).create(request).await
    }

    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError> {
        (**self).get(id).await
    }

    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        (**self).compare_and_transition(id, expected, new_state, mutator).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError> {
        (**self).sweep_expired(now, limit).await
    }

    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        (**self).reap(cutoff, limit).await
    }

    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError> {
        (**self).find_pending(subject_id, purpose).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        (**self).health_check().await
    }
}

/// Build the record that a transition commits
///
/// Runs `mutator` on a copy of `current`, restores the identity fields and
/// sets the new state. Store implementations call this after they have
/// checked the transition.
pub fn apply_transition(
    current: &VerificationRequest,
    new_state: VerificationState,
    mutator: StateMutator<'_>,
) -> VerificationRequest {
    let mut next = current.clone();
    mutator(&mut next);

    next.id = current.id;
    next.subject_id = current.subject_id.clone();
    next.purpose = current.purpose;
    next.secret_hash = current.secret_hash.clone();
    next.created_at = current.created_at;
    next.expires_at = current.expires_at;
    next.state = new_state;
    next
}

/// Reject transitions out of terminal states before touching storage
pub fn check_transition(
    expected: VerificationState,
    new_state: VerificationState,
) -> Result<(), StoreError> {
    if expected.can_transition_to(new_state) {
        Ok(())
    } else {
        Err(StoreError::InvalidTransition {
            from: expected,
            to: new_state,
        })
    }
}
