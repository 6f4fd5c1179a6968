//! Read-only view of a verification request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Purpose, VerificationRequest, VerificationState};

/// A verification request without its secret hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub request_id: Uuid,
    pub subject_id: String,
    pub purpose: Purpose,
    pub state: VerificationState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl From<&VerificationRequest> for RequestStatus {
    fn from(request: &VerificationRequest) -> Self {
        Self {
            request_id: request.id,
            subject_id: request.subject_id.clone(),
            purpose: request.purpose,
            state: request.state,
            created_at: request.created_at,
            expires_at: request.expires_at,
            attempts: request.attempts,
            finalized_at: request.finalized_at,
        }
    }
}
