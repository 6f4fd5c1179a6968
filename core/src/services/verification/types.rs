//! Request and result types for the verification engine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Purpose, VerificationState};

/// Input of an issuance
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Identity being verified
    pub subject_id: String,
    /// Verification purpose
    pub purpose: Purpose,
    /// Lifetime override; the purpose default applies when `None`
    pub ttl: Option<Duration>,
    /// Address the notifier delivers to; defaults to the subject id
    pub destination: Option<String>,
}

impl IssueRequest {
    pub fn new(subject_id: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            subject_id: subject_id.into(),
            purpose,
            ttl: None,
            destination: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

/// What a notifier receives
///
/// The only place the raw token exists outside the subject's hands.
#[derive(Clone)]
pub struct Delivery {
    pub request_id: Uuid,
    pub subject_id: String,
    pub purpose: Purpose,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub destination: String,
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("request_id", &self.request_id)
            .field("purpose", &self.purpose)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Result of a successful issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOutcome {
    pub request_id: Uuid,
    pub expires_at: DateTime<Utc>,
    /// Provider message id returned by the notifier
    pub message_id: String,
}

/// Result of a successful confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    pub request_id: Uuid,
    pub subject_id: String,
    pub purpose: Purpose,
    pub verified_at: DateTime<Utc>,
}

/// Result of a revocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeOutcome {
    pub request_id: Uuid,
    pub state: VerificationState,
    /// False when the request was already revoked
    pub changed: bool,
}
