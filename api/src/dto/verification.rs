//! Request and response bodies for the verification endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vt_core::{ConfirmOutcome, IssueOutcome, IssueRequest, Purpose, RevokeOutcome, VerificationState};

/// Body of `POST /issue` and `POST /reissue`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueVerificationRequest {
    #[validate(length(min = 1, max = 255))]
    pub subject_id: String,
    pub purpose: Purpose,
    /// Overrides the purpose default; 0 issues an already due token
    pub ttl_seconds: Option<u64>,
    /// E-mail address or phone number; defaults to `subject_id`
    #[validate(length(min = 3, max = 320))]
    pub destination: Option<String>,
}

impl IssueVerificationRequest {
    /// Convert into the engine request
    ///
    /// TTLs too large for a duration are clamped; the engine rejects them
    /// against its configured maximum.
    pub fn into_issue_request(self) -> IssueRequest {
        let mut request = IssueRequest::new(self.subject_id, self.purpose);
        if let Some(seconds) = self.ttl_seconds {
            let seconds = i64::try_from(seconds).unwrap_or(i64::MAX).min(i64::MAX / 1_000_000);
            request = request.with_ttl(chrono::Duration::seconds(seconds));
        }
        if let Some(destination) = self.destination {
            request = request.with_destination(destination);
        }
        request
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueVerificationResponse {
    pub request_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<IssueOutcome> for IssueVerificationResponse {
    fn from(outcome: IssueOutcome) -> Self {
        Self {
            request_id: outcome.request_id,
            expires_at: outcome.expires_at,
        }
    }
}

/// Body of `POST /confirm`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmVerificationRequest {
    #[validate(length(min = 1, max = 4096))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmVerificationResponse {
    pub request_id: Uuid,
    pub subject_id: String,
    pub purpose: Purpose,
    pub verified_at: DateTime<Utc>,
}

impl From<ConfirmOutcome> for ConfirmVerificationResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        Self {
            request_id: outcome.request_id,
            subject_id: outcome.subject_id,
            purpose: outcome.purpose,
            verified_at: outcome.verified_at,
        }
    }
}

/// Body of `POST /revoke`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeVerificationRequest {
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeVerificationResponse {
    pub request_id: Uuid,
    pub state: VerificationState,
    /// False when the request was already revoked
    pub changed: bool,
}

impl From<RevokeOutcome> for RevokeVerificationResponse {
    fn from(outcome: RevokeOutcome) -> Self {
        Self {
            request_id: outcome.request_id,
            state: outcome.state,
            changed: outcome.changed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
