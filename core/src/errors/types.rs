//! Error types for the token codec, the store contract and the engine
//!
//! `VerificationError` is the taxonomy callers see. Codec and store errors
//! are converted into it by the engine, which decides how a store conflict
//! is reported for the operation at hand.

use thiserror::Error;
use uuid::Uuid;
use vt_shared::error_codes;

use crate::domain::entities::{Purpose, VerificationState};

/// Token codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed verification token")]
    MalformedToken,

    #[error("Verification token signature is invalid")]
    InvalidSignature,

    #[error("Failed to encode verification token: {message}")]
    EncodingFailed { message: String },

    #[error("Invalid signing key configuration: {message}")]
    KeyConfiguration { message: String },
}

/// Store contract errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Verification request {id} already exists")]
    DuplicateId { id: Uuid },

    #[error("Verification request {id} not found")]
    NotFound { id: Uuid },

    #[error("Verification request is {current}, not the expected state")]
    StateConflict { current: VerificationState },

    #[error("Illegal state transition from {from} to {to}")]
    InvalidTransition {
        from: VerificationState,
        to: VerificationState,
    },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Stored record is corrupt: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    /// Transient failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Errors surfaced by the verification engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Malformed verification token")]
    MalformedToken,

    #[error("Verification token signature is invalid")]
    InvalidSignature,

    #[error("Verification request not found")]
    NotFound,

    #[error("Verification request is already {state}")]
    AlreadyFinalized {
        state: VerificationState,
        subject_id: String,
        purpose: Purpose,
    },

    #[error("Verification token has expired")]
    TokenExpired,

    #[error("Verification secret does not match, {remaining_attempts} attempt(s) remaining")]
    SecretMismatch { remaining_attempts: u32 },

    #[error("Too many failed attempts, the verification request has been revoked")]
    TooManyAttempts,

    #[error("Failed to deliver verification token for request {request_id}: {reason}")]
    DeliveryFailed { request_id: Uuid, reason: String },

    #[error("Too many verification requests, retry in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Verification service temporarily unavailable")]
    Unavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl VerificationError {
    /// Stable machine readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidRequest { .. } => error_codes::VALIDATION_ERROR,
            VerificationError::MalformedToken => error_codes::MALFORMED_TOKEN,
            VerificationError::InvalidSignature => error_codes::INVALID_SIGNATURE,
            VerificationError::NotFound => error_codes::NOT_FOUND,
            VerificationError::AlreadyFinalized { .. } => error_codes::ALREADY_FINALIZED,
            VerificationError::TokenExpired => error_codes::TOKEN_EXPIRED,
            VerificationError::SecretMismatch { .. } => error_codes::SECRET_MISMATCH,
            VerificationError::TooManyAttempts => error_codes::TOO_MANY_ATTEMPTS,
            VerificationError::DeliveryFailed { .. } => error_codes::DELIVERY_FAILED,
            VerificationError::RateLimited { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            VerificationError::Unavailable { .. } => error_codes::UNAVAILABLE,
            VerificationError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether the same call may succeed later
    ///
    /// Client-input errors are final for the token that caused them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationError::Unavailable { .. }
                | VerificationError::DeliveryFailed { .. }
                | VerificationError::RateLimited { .. }
        )
    }
}

impl From<TokenError> for VerificationError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MalformedToken => VerificationError::MalformedToken,
            TokenError::InvalidSignature => VerificationError::InvalidSignature,
            TokenError::EncodingFailed { message } | TokenError::KeyConfiguration { message } => {
                VerificationError::Internal { message }
            }
        }
    }
}

impl From<StoreError> for VerificationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => VerificationError::NotFound,
            StoreError::Unavailable { message } => VerificationError::Unavailable { message },
            other => VerificationError::Internal {
                message: other.to_string(),
            },
        }
    }
}
