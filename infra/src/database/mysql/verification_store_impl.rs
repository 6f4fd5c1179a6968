//! MySQL implementation of the VerificationStore trait.
//!
//! Records live in the `verification_requests` table. State changes are
//! conditional updates guarded by the expected state and a `version` column,
//! so two instances of the service sharing the database still see exactly
//! one winner per transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlDatabaseError, MySqlRow};
use sqlx::{MySqlPool, Row};
use std::time::{Duration, Instant};
use uuid::Uuid;

use vt_core::domain::entities::{Purpose, VerificationRequest, VerificationState};
use vt_core::errors::StoreError;
use vt_core::repositories::{apply_transition, check_transition, StateMutator, VerificationStore};

use crate::database::DatabasePool;

/// Schema of the verification table
pub const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS verification_requests (
        id CHAR(36) NOT NULL PRIMARY KEY,
        subject_id VARCHAR(255) NOT NULL,
        purpose VARCHAR(32) NOT NULL,
        secret_hash CHAR(64) NOT NULL,
        state VARCHAR(16) NOT NULL,
        created_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        finalized_at DATETIME(6) NULL,
        attempts INT UNSIGNED NOT NULL DEFAULT 0,
        version BIGINT NOT NULL DEFAULT 0,
        INDEX idx_state_expires (state, expires_at),
        INDEX idx_subject_purpose_state (subject_id, purpose, state)
    )
"#;

const SELECT_COLUMNS: &str = "id, subject_id, purpose, secret_hash, state, created_at, expires_at, finalized_at, attempts, version";

/// Conditional update attempts before a transition gives up
const MAX_CAS_RETRIES: u32 = 5;

/// MySQL implementation of VerificationStore
pub struct MySqlVerificationStore {
    /// Database connection pool
    pool: MySqlPool,
    /// Queries slower than this are logged
    slow_query_threshold: Duration,
}

impl MySqlVerificationStore {
    /// Create a new MySQL verification store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            slow_query_threshold: Duration::from_millis(1000),
        }
    }

    /// Create the store from a configured pool wrapper
    pub fn from_pool(pool: &DatabasePool, slow_query_threshold_ms: u64) -> Self {
        Self {
            pool: pool.inner().clone(),
            slow_query_threshold: Duration::from_millis(slow_query_threshold_ms),
        }
    }

    /// Create the table and indexes when missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        tracing::info!("verification_requests table ready");
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<(VerificationRequest, i64), StoreError> {
        let query = format!("SELECT {} FROM verification_requests WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(StoreError::NotFound { id })?;

        row_to_request(&row)
    }

    fn log_if_slow(&self, operation: &'static str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.slow_query_threshold {
            tracing::warn!(
                operation,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "Slow verification store query"
            );
        }
    }
}

#[async_trait]
impl VerificationStore for MySqlVerificationStore {
    async fn create(&self, request: VerificationRequest) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO verification_requests (
                id, subject_id, purpose, secret_hash, state,
                created_at, expires_at, finalized_at, attempts, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
        "#;

        sqlx::query(query)
            .bind(request.id.to_string())
            .bind(&request.subject_id)
            .bind(request.purpose.as_str())
            .bind(&request.secret_hash)
            .bind(request.state.as_str())
            .bind(request.created_at)
            .bind(request.expires_at)
            .bind(request.finalized_at)
            .bind(request.attempts)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateId { id: request.id }
                } else {
                    map_sqlx_error(e)
                }
            })?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<VerificationRequest, StoreError> {
        self.fetch(id).await.map(|(request, _)| request)
    }

    async fn compare_and_transition(
        &self,
        id: Uuid,
        expected: VerificationState,
        new_state: VerificationState,
        mutator: StateMutator<'_>,
    ) -> Result<VerificationRequest, StoreError> {
        check_transition(expected, new_state)?;
        let started = Instant::now();

        for _ in 0..MAX_CAS_RETRIES {
            let (current, version) = self.fetch(id).await?;
            if current.state != expected {
                return Err(StoreError::StateConflict { current: current.state });
            }

            let next = apply_transition(&current, new_state, mutator);

            let result = sqlx::query(
                r#"
                UPDATE verification_requests
                SET state = ?, attempts = ?, finalized_at = ?, version = version + 1
                WHERE id = ? AND state = ? AND version = ?
                "#,
            )
            .bind(next.state.as_str())
            .bind(next.attempts)
            .bind(next.finalized_at)
            .bind(id.to_string())
            .bind(expected.as_str())
            .bind(version)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            if result.rows_affected() == 1 {
                self.log_if_slow("compare_and_transition", started);
                return Ok(next);
            }

            // Another writer bumped the version; re-read and decide again
            tracing::debug!(request_id = %id, "Conditional update lost a version race, retrying");
        }

        Err(StoreError::Unavailable {
            message: format!("too much contention on verification request {}", id),
        })
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>, StoreError> {
        let started = Instant::now();

        let rows = sqlx::query(
            r#"
            SELECT id FROM verification_requests
            WHERE state = ? AND expires_at < ?
            ORDER BY expires_at
            LIMIT ?
            "#,
        )
        .bind(VerificationState::Pending.as_str())
        .bind(now)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut expired = Vec::with_capacity(rows.len());
        for row in rows {
            let id = parse_id(&row)?;

            // A confirmation may have landed since the select; only report ids this call moved
            let result = sqlx::query(
                r#"
                UPDATE verification_requests
                SET state = ?, finalized_at = ?, version = version + 1
                WHERE id = ? AND state = ?
                "#,
            )
            .bind(VerificationState::Expired.as_str())
            .bind(now)
            .bind(id.to_string())
            .bind(VerificationState::Pending.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            if result.rows_affected() == 1 {
                expired.push(id);
            }
        }

        self.log_if_slow("sweep_expired", started);
        Ok(expired)
    }

    async fn reap(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_requests
            WHERE state IN (?, ?, ?) AND expires_at < ?
            LIMIT ?
            "#,
        )
        .bind(VerificationState::Verified.as_str())
        .bind(VerificationState::Expired.as_str())
        .bind(VerificationState::Revoked.as_str())
        .bind(cutoff)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn find_pending(&self, subject_id: &str, purpose: Purpose) -> Result<Vec<Uuid>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM verification_requests
            WHERE subject_id = ? AND purpose = ? AND state = ?
            ORDER BY created_at
            "#,
        )
        .bind(subject_id)
        .bind(purpose.as_str())
        .bind(VerificationState::Pending.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(parse_id).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// MySQL error numbers that clear up when the statement is retried
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;
const ER_LOCK_DEADLOCK: u16 = 1213;

/// Translate driver errors into store errors
///
/// Connection level failures are transient and surface as `Unavailable` so
/// the engine retries them; decoding problems mean the row itself is bad.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable {
            message: e.to_string(),
        },
        sqlx::Error::Database(db) => classify_database_error(
            db.try_downcast_ref::<MySqlDatabaseError>().map(|e| e.number()),
            db.to_string(),
        ),
        other => StoreError::Corrupt {
            message: other.to_string(),
        },
    }
}

/// Server-reported errors are permanent unless they are lock contention
pub(crate) fn classify_database_error(number: Option<u16>, message: String) -> StoreError {
    match number {
        Some(ER_LOCK_WAIT_TIMEOUT) | Some(ER_LOCK_DEADLOCK) => StoreError::Unavailable { message },
        _ => StoreError::Corrupt { message },
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt {
        message: format!("invalid {}: {}", field, detail),
    }
}

fn parse_id(row: &MySqlRow) -> Result<Uuid, StoreError> {
    let id: String = row.try_get("id").map_err(|e| corrupt("id", e))?;
    Uuid::parse_str(&id).map_err(|e| corrupt("id", e))
}

/// Convert a database row into the entity and its row version
fn row_to_request(row: &MySqlRow) -> Result<(VerificationRequest, i64), StoreError> {
    let purpose: String = row.try_get("purpose").map_err(|e| corrupt("purpose", e))?;
    let state: String = row.try_get("state").map_err(|e| corrupt("state", e))?;

    let request = VerificationRequest {
        id: parse_id(row)?,
        subject_id: row.try_get("subject_id").map_err(|e| corrupt("subject_id", e))?,
        purpose: purpose.parse::<Purpose>().map_err(|e| corrupt("purpose", e))?,
        secret_hash: row.try_get("secret_hash").map_err(|e| corrupt("secret_hash", e))?,
        state: state.parse::<VerificationState>().map_err(|e| corrupt("state", e))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| corrupt("created_at", e))?,
        expires_at: row
            .try_get::<DateTime<Utc>, _>("expires_at")
            .map_err(|e| corrupt("expires_at", e))?,
        finalized_at: row
            .try_get::<Option<DateTime<Utc>>, _>("finalized_at")
            .map_err(|e| corrupt("finalized_at", e))?,
        attempts: row.try_get::<u32, _>("attempts").map_err(|e| corrupt("attempts", e))?,
    };
    let version: i64 = row.try_get("version").map_err(|e| corrupt("version", e))?;

    Ok((request, version))
}
