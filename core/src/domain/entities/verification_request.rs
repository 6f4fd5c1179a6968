//! Verification request entity and its lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest accepted subject identifier, in bytes
pub const MAX_SUBJECT_ID_LENGTH: usize = 255;

/// Business reason a verification is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Confirm ownership of an e-mail address
    EmailConfirm,
    /// Confirm ownership of a phone number
    PhoneConfirm,
    /// Authorize a password reset
    PasswordReset,
    /// Confirm a pending account action
    AccountAction,
}

impl Purpose {
    /// Stable string form used in tokens, storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::EmailConfirm => "email_confirm",
            Purpose::PhoneConfirm => "phone_confirm",
            Purpose::PasswordReset => "password_reset",
            Purpose::AccountAction => "account_action",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_confirm" => Ok(Purpose::EmailConfirm),
            "phone_confirm" => Ok(Purpose::PhoneConfirm),
            "password_reset" => Ok(Purpose::PasswordReset),
            "account_action" => Ok(Purpose::AccountAction),
            other => Err(format!("Unknown purpose: {}", other)),
        }
    }
}

/// Lifecycle state of a verification request
///
/// `Pending` is the only non-terminal state. Every other state is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Pending,
    Verified,
    Expired,
    Revoked,
}

impl VerificationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationState::Pending => "pending",
            VerificationState::Verified => "verified",
            VerificationState::Expired => "expired",
            VerificationState::Revoked => "revoked",
        }
    }

    /// Whether no further transition can leave this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationState::Pending)
    }

    /// Whether `self -> next` is a legal transition
    ///
    /// Pending may stay Pending (attempt bookkeeping) or move to any terminal
    /// state. Nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: VerificationState) -> bool {
        matches!((self, next), (VerificationState::Pending, _))
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationState::Pending),
            "verified" => Ok(VerificationState::Verified),
            "expired" => Ok(VerificationState::Expired),
            "revoked" => Ok(VerificationState::Revoked),
            other => Err(format!("Unknown verification state: {}", other)),
        }
    }
}

/// A single verification attempt handed to a subject
///
/// Only the hash of the secret is kept; the raw secret travels inside the
/// token and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Unique, immutable identifier
    pub id: Uuid,

    /// Identity being verified
    pub subject_id: String,

    /// Why the verification is performed
    pub purpose: Purpose,

    /// Hex encoded SHA-256 of the secret
    pub secret_hash: String,

    /// Current lifecycle state
    pub state: VerificationState,

    /// When the request was issued
    pub created_at: DateTime<Utc>,

    /// When the token stops being confirmable; always after `created_at`
    pub expires_at: DateTime<Utc>,

    /// Failed confirmation attempts so far
    pub attempts: u32,

    /// When the request reached a terminal state
    pub finalized_at: Option<DateTime<Utc>>,
}

impl VerificationRequest {
    /// Creates a new pending request
    ///
    /// # Arguments
    ///
    /// * `id` - Request identifier
    /// * `subject_id` - Identity being verified
    /// * `purpose` - Verification purpose
    /// * `secret_hash` - Hash of the secret embedded in the token
    /// * `created_at` - Issue time
    /// * `expires_at` - Expiry time, must be after `created_at`
    pub fn new(
        id: Uuid,
        subject_id: impl Into<String>,
        purpose: Purpose,
        secret_hash: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject_id: subject_id.into(),
            purpose,
            secret_hash: secret_hash.into(),
            state: VerificationState::Pending,
            created_at,
            expires_at,
            attempts: 0,
            finalized_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == VerificationState::Pending
    }

    /// Checks if the token's lifetime has elapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Gets the number of failed attempts still allowed before revocation
    pub fn remaining_attempts(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }
}
