//! Verification engine implementation

use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;
use vt_shared::mask_destination;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::{Purpose, VerificationRequest, VerificationState, MAX_SUBJECT_ID_LENGTH};
use crate::domain::value_objects::{RequestStatus, VerificationSecret};
use crate::errors::{StoreError, VerificationError, VerificationResult};
use crate::repositories::{StateMutator, VerificationStore};
use crate::services::codec::TokenCodec;

use super::config::VerificationServiceConfig;
use super::rate_limiter::InMemoryIssueRateLimiter;
use super::traits::{IssueRateLimiter, RateDecision, VerificationNotifier};
use super::types::{ConfirmOutcome, Delivery, IssueOutcome, IssueRequest, RevokeOutcome};

/// Orchestrates issuance, confirmation and revocation of verification requests
///
/// Holds no mutable state of its own besides the rate limiter; every
/// cross-request decision is made by the store's conditional transition, so
/// one engine can serve any number of concurrent callers.
pub struct VerificationEngine<S: VerificationStore> {
    /// Persistence for verification requests
    store: Arc<S>,
    /// Token encoder/decoder
    codec: TokenCodec,
    /// Engine configuration
    config: VerificationServiceConfig,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Issuance rate rule
    rate_limiter: Arc<dyn IssueRateLimiter>,
}

impl<S: VerificationStore> VerificationEngine<S> {
    /// Create a new verification engine
    ///
    /// # Arguments
    ///
    /// * `store` - Store implementation
    /// * `codec` - Token codec holding the signing keys
    /// * `config` - Engine configuration
    pub fn new(store: Arc<S>, codec: TokenCodec, config: VerificationServiceConfig) -> Self {
        let rate_limiter = Arc::new(InMemoryIssueRateLimiter::new(config.issue_limit, config.issue_window));
        Self {
            store,
            codec,
            config,
            clock: Arc::new(SystemClock),
            rate_limiter,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the issuance rate limiter
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn IssueRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Issue a verification token and hand it to the notifier
    ///
    /// This method:
    /// 1. Validates the subject and resolves the TTL
    /// 2. Applies the issuance rate rule
    /// 3. Revokes earlier pending requests when `supersede_pending` is set
    /// 4. Generates a secret and persists a pending request (one retry on id collision)
    /// 5. Encodes the token and delivers it within the delivery timeout
    ///
    /// # Returns
    ///
    /// * `Ok(IssueOutcome)` - Request id and expiry; the token itself only goes to the notifier
    /// * `Err(VerificationError::DeliveryFailed)` - The pending request exists but delivery failed
    /// * `Err(VerificationError)` - Validation, rate limit or store failure
    pub async fn issue(
        &self,
        request: IssueRequest,
        notifier: &dyn VerificationNotifier,
    ) -> VerificationResult<IssueOutcome> {
        self.issue_inner(request, notifier, self.config.supersede_pending).await
    }

    /// Revoke every pending request for the subject and purpose, then issue a new one
    ///
    /// This is the explicit "send me a new code" path; it runs the same
    /// validation and rate rule as [`VerificationEngine::issue`].
    pub async fn reissue(
        &self,
        request: IssueRequest,
        notifier: &dyn VerificationNotifier,
    ) -> VerificationResult<IssueOutcome> {
        self.issue_inner(request, notifier, true).await
    }

    async fn issue_inner(
        &self,
        request: IssueRequest,
        notifier: &dyn VerificationNotifier,
        supersede: bool,
    ) -> VerificationResult<IssueOutcome> {
        let IssueRequest {
            subject_id,
            purpose,
            ttl,
            destination,
        } = request;

        validate_subject(&subject_id)?;
        let ttl = self.resolve_ttl(purpose, ttl)?;
        self.check_rate(&subject_id, purpose).await?;

        if supersede {
            self.revoke_pending(&subject_id, purpose).await?;
        }

        let secret = VerificationSecret::generate();
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| VerificationError::InvalidRequest {
                message: "ttl is out of range".to_string(),
            })?;
        let record = self
            .create_record(&subject_id, purpose, &secret, now, expires_at)
            .await?;

        let token = self.codec.encode(record.id, &secret, purpose, expires_at)?;

        tracing::info!(
            request_id = %record.id,
            subject = %mask_destination(&subject_id),
            purpose = %purpose,
            expires_at = %expires_at,
            event = "verification_issued",
            "Issued verification request"
        );

        let delivery = Delivery {
            request_id: record.id,
            subject_id: subject_id.clone(),
            purpose,
            token,
            expires_at,
            destination: destination.unwrap_or(subject_id),
        };
        let message_id = self.deliver(notifier, &delivery).await?;

        Ok(IssueOutcome {
            request_id: record.id,
            expires_at,
            message_id,
        })
    }

    /// Confirm a verification token
    ///
    /// # Returns
    ///
    /// * `Ok(ConfirmOutcome)` - The request moved from Pending to Verified by this call
    /// * `Err(VerificationError::AlreadyFinalized)` - Verified or revoked earlier, or a concurrent call won
    /// * `Err(VerificationError::TokenExpired)` - The lifetime elapsed, even with the right secret
    /// * `Err(VerificationError::SecretMismatch)` - Wrong secret, attempts remain
    /// * `Err(VerificationError::TooManyAttempts)` - Wrong secret and the attempt limit was reached
    pub async fn confirm(&self, token: &str) -> VerificationResult<ConfirmOutcome> {
        let decoded = self.codec.decode(token).map_err(|e| {
            tracing::debug!(error = %e, event = "token_rejected", "Verification token rejected");
            VerificationError::from(e)
        })?;
        let id = decoded.request_id;

        let record = self.get_record(id).await?;
        if record.purpose != decoded.purpose {
            tracing::warn!(
                request_id = %id,
                event = "token_purpose_mismatch",
                "Token purpose does not match the stored request"
            );
            return Err(VerificationError::MalformedToken);
        }

        if record.state != VerificationState::Pending {
            return Err(finalized_error(&record, record.state));
        }

        let now = self.clock.now();
        if record.is_expired_at(now) {
            return self.expire(&record, now).await;
        }

        if !decoded.secret.matches_hash(&record.secret_hash) {
            return self.record_failed_attempt(&record, now).await;
        }

        let finalize = move |r: &mut VerificationRequest| r.finalized_at = Some(now);
        match self
            .transition(id, VerificationState::Pending, VerificationState::Verified, &finalize)
            .await
        {
            Ok(verified) => {
                tracing::info!(
                    request_id = %id,
                    subject = %mask_destination(&verified.subject_id),
                    purpose = %verified.purpose,
                    event = "verification_confirmed",
                    "Verification request confirmed"
                );
                Ok(ConfirmOutcome {
                    request_id: id,
                    subject_id: verified.subject_id,
                    purpose: verified.purpose,
                    verified_at: now,
                })
            }
            Err(StoreError::StateConflict { current }) => {
                tracing::info!(
                    request_id = %id,
                    current = %current,
                    event = "confirmation_race_lost",
                    "Concurrent transition finalized the request first"
                );
                Err(finalized_error(&record, current))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Revoke a verification request
    ///
    /// Pending requests become Revoked. Revoking an already revoked request
    /// is acknowledged without change; verified and expired requests answer
    /// `AlreadyFinalized`.
    pub async fn revoke(&self, id: Uuid) -> VerificationResult<RevokeOutcome> {
        let record = self.get_record(id).await?;
        let unchanged = RevokeOutcome {
            request_id: id,
            state: VerificationState::Revoked,
            changed: false,
        };

        match record.state {
            VerificationState::Revoked => return Ok(unchanged),
            VerificationState::Verified | VerificationState::Expired => {
                return Err(finalized_error(&record, record.state));
            }
            VerificationState::Pending => {}
        }

        let now = self.clock.now();
        let finalize = move |r: &mut VerificationRequest| r.finalized_at = Some(now);
        match self
            .transition(id, VerificationState::Pending, VerificationState::Revoked, &finalize)
            .await
        {
            Ok(_) => {
                tracing::info!(request_id = %id, event = "verification_revoked", "Verification request revoked");
                Ok(RevokeOutcome {
                    request_id: id,
                    state: VerificationState::Revoked,
                    changed: true,
                })
            }
            Err(StoreError::StateConflict {
                current: VerificationState::Revoked,
            }) => Ok(unchanged),
            Err(StoreError::StateConflict { current }) => Err(finalized_error(&record, current)),
            Err(e) => Err(e.into()),
        }
    }

    /// Current state of a request, without its secret hash
    pub async fn status(&self, id: Uuid) -> VerificationResult<RequestStatus> {
        let record = self.get_record(id).await?;
        Ok(RequestStatus::from(&record))
    }

    /// Check that the store answers
    pub async fn health_check(&self) -> VerificationResult<()> {
        self.store.health_check().await.map_err(VerificationError::from)
    }

    /// Revoke pending requests for a subject and purpose, returning how many were revoked
    pub async fn revoke_pending(&self, subject_id: &str, purpose: Purpose) -> VerificationResult<usize> {
        let ids = self
            .with_store_retry("find_pending", || self.store.find_pending(subject_id, purpose))
            .await?;

        let now = self.clock.now();
        let finalize = move |r: &mut VerificationRequest| r.finalized_at = Some(now);
        let mut revoked = 0;
        for id in ids {
            match self
                .transition(id, VerificationState::Pending, VerificationState::Revoked, &finalize)
                .await
            {
                Ok(_) => revoked += 1,
                // Finalized concurrently or reaped; nothing left to supersede
                Err(StoreError::StateConflict { .. }) | Err(StoreError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if revoked > 0 {
            tracing::info!(
                subject = %mask_destination(subject_id),
                purpose = %purpose,
                revoked,
                event = "pending_superseded",
                "Revoked earlier pending verification requests"
            );
        }
        Ok(revoked)
    }

    fn resolve_ttl(&self, purpose: Purpose, requested: Option<Duration>) -> VerificationResult<Duration> {
        let ttl = requested.unwrap_or_else(|| self.config.default_ttl(purpose));

        if ttl < Duration::zero() {
            return Err(VerificationError::InvalidRequest {
                message: "ttl must not be negative".to_string(),
            });
        }
        if ttl > self.config.max_ttl {
            return Err(VerificationError::InvalidRequest {
                message: format!("ttl must not exceed {} seconds", self.config.max_ttl.num_seconds()),
            });
        }
        // expires_at must stay strictly after created_at
        Ok(ttl.max(Duration::milliseconds(1)))
    }

    async fn check_rate(&self, subject_id: &str, purpose: Purpose) -> VerificationResult<()> {
        let key = format!("{}:{}", purpose, subject_id);
        match self.rate_limiter.check_and_record(&key, self.clock.now()).await {
            Ok(RateDecision::Allowed) => Ok(()),
            Ok(RateDecision::Limited { retry_after_seconds }) => {
                tracing::warn!(
                    subject = %mask_destination(subject_id),
                    purpose = %purpose,
                    retry_after_seconds,
                    event = "rate_limit_exceeded",
                    "Verification issuance rate limit exceeded"
                );
                Err(VerificationError::RateLimited { retry_after_seconds })
            }
            Err(e) => {
                // The limiter protects delivery channels; its outage must not block issuance
                tracing::warn!(error = %e, event = "rate_limiter_unavailable", "Rate limiter failed, allowing issuance");
                Ok(())
            }
        }
    }

    async fn create_record(
        &self,
        subject_id: &str,
        purpose: Purpose,
        secret: &VerificationSecret,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> VerificationResult<VerificationRequest> {
        let secret_hash = secret.hash();
        let mut collided = false;

        loop {
            let record = VerificationRequest::new(
                Uuid::new_v4(),
                subject_id,
                purpose,
                secret_hash.clone(),
                created_at,
                expires_at,
            );

            match self
                .with_store_retry("create", || self.store.create(record.clone()))
                .await
            {
                Ok(()) => return Ok(record),
                Err(StoreError::DuplicateId { id }) => {
                    if self.is_own_insert(&record).await? {
                        tracing::info!(request_id = %id, event = "create_ack_lost", "Insert landed before a retried attempt");
                        return Ok(record);
                    }
                    if collided {
                        return Err(VerificationError::Unavailable {
                            message: "could not allocate a unique request id".to_string(),
                        });
                    }
                    tracing::warn!(request_id = %id, event = "request_id_collision", "Request id collision, retrying with a new id");
                    collided = true;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// A retried insert whose first attempt landed reports `DuplicateId` for
    /// our own row; the secret hash tells it apart from a real id collision.
    async fn is_own_insert(&self, record: &VerificationRequest) -> VerificationResult<bool> {
        match self.with_store_retry("get", || self.store.get(record.id)).await {
            Ok(existing) => Ok(existing.secret_hash == record.secret_hash
                && existing.subject_id == record.subject_id
                && existing.purpose == record.purpose),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn deliver(&self, notifier: &dyn VerificationNotifier, delivery: &Delivery) -> VerificationResult<String> {
        let channel = notifier.channel_name().to_string();
        let outcome = tokio::time::timeout(self.config.delivery_timeout, notifier.deliver(delivery)).await;

        let reason = match outcome {
            Ok(Ok(message_id)) => {
                tracing::info!(
                    request_id = %delivery.request_id,
                    channel = %channel,
                    destination = %mask_destination(&delivery.destination),
                    message_id = %message_id,
                    event = "verification_delivered",
                    "Verification token delivered"
                );
                return Ok(message_id);
            }
            Ok(Err(reason)) => reason,
            Err(_) => format!(
                "delivery timed out after {} ms",
                self.config.delivery_timeout.as_millis()
            ),
        };

        tracing::warn!(
            request_id = %delivery.request_id,
            channel = %channel,
            destination = %mask_destination(&delivery.destination),
            reason = %reason,
            event = "delivery_failed",
            "Verification token delivery failed, pending request kept"
        );
        Err(VerificationError::DeliveryFailed {
            request_id: delivery.request_id,
            reason,
        })
    }

    async fn expire(&self, record: &VerificationRequest, now: DateTime<Utc>) -> VerificationResult<ConfirmOutcome> {
        let finalize = move |r: &mut VerificationRequest| r.finalized_at = Some(now);
        match self
            .transition(record.id, VerificationState::Pending, VerificationState::Expired, &finalize)
            .await
        {
            Ok(_) => {
                tracing::info!(request_id = %record.id, event = "token_expired", "Verification request expired on confirmation");
                Err(VerificationError::TokenExpired)
            }
            Err(StoreError::StateConflict { current }) => Err(finalized_error(record, current)),
            Err(e) => Err(e.into()),
        }
    }

    async fn record_failed_attempt(
        &self,
        record: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> VerificationResult<ConfirmOutcome> {
        let bump = |r: &mut VerificationRequest| r.attempts = r.attempts.saturating_add(1);
        let updated = match self
            .transition(record.id, VerificationState::Pending, VerificationState::Pending, &bump)
            .await
        {
            Ok(updated) => updated,
            Err(StoreError::StateConflict { current }) => return Err(finalized_error(record, current)),
            Err(e) => return Err(e.into()),
        };

        if updated.attempts < self.config.max_attempts {
            let remaining_attempts = updated.remaining_attempts(self.config.max_attempts);
            tracing::warn!(
                request_id = %record.id,
                attempts = updated.attempts,
                remaining_attempts,
                event = "confirmation_secret_mismatch",
                "Verification secret mismatch"
            );
            return Err(VerificationError::SecretMismatch { remaining_attempts });
        }

        let finalize = move |r: &mut VerificationRequest| r.finalized_at = Some(now);
        match self
            .transition(record.id, VerificationState::Pending, VerificationState::Revoked, &finalize)
            .await
        {
            Ok(_)
            | Err(StoreError::StateConflict {
                current: VerificationState::Revoked,
            }) => {
                tracing::warn!(
                    request_id = %record.id,
                    attempts = updated.attempts,
                    event = "verification_revoked_attempts",
                    "Attempt limit reached, verification request revoked"
                );
                Err(VerificationError::TooManyAttempts)
            }
            Err(StoreError::StateConflict { current }) => Err(finalized_error(record, current)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_record(&self, id: Uuid) -> VerificationResult<VerificationRequest> {
        self.with_store_retry("get", || self.store.get(id))
            .await
            .map_err(VerificationError::from)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        self.with_store_retry("compare_and_transition", || {
            self.store.compare_and_transition(id, expected, new_state, mutator)
        })
        .await
    }

    /// Retry a store call while it reports `Unavailable`, with linear back-off
    async fn with_store_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.config.store_retry_attempts => {
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %e,
                        event = "store_retry",
                        "Store unavailable, retrying"
                    );
                    tokio::time::sleep(self.config.store_retry_delay * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

fn validate_subject(subject_id: &str) -> VerificationResult<()> {
    if subject_id.trim().is_empty() {
        return Err(VerificationError::InvalidRequest {
            message: "subject_id must not be empty".to_string(),
        });
    }
    if subject_id.len() > MAX_SUBJECT_ID_LENGTH {
        return Err(VerificationError::InvalidRequest {
            message: format!("subject_id must be at most {} bytes", MAX_SUBJECT_ID_LENGTH),
        });
    }
    Ok(())
}

/// Error for a request found in `state` when Pending was needed
fn finalized_error(record: &VerificationRequest, state: VerificationState) -> VerificationError {
    match state {
        VerificationState::Expired => VerificationError::TokenExpired,
        VerificationState::Verified | VerificationState::Revoked => VerificationError::AlreadyFinalized {
            state,
            subject_id: record.subject_id.clone(),
            purpose: record.purpose,
        },
        VerificationState::Pending => VerificationError::Internal {
            message: format!("request {} reported a conflict while still pending", record.id),
        },
    }
}
