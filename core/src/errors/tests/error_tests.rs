use uuid::Uuid;

use crate::domain::entities::{Purpose, VerificationState};
use crate::errors::{StoreError, TokenError, VerificationError};

#[test]
fn test_token_errors_map_to_client_errors() {
    assert_eq!(VerificationError::from(TokenError::MalformedToken), VerificationError::MalformedToken);
    assert_eq!(VerificationError::from(TokenError::InvalidSignature), VerificationError::InvalidSignature);
    assert!(matches!(
        VerificationError::from(TokenError::EncodingFailed { message: "boom".into() }),
        VerificationError::Internal { .. }
    ));
}

#[test]
fn test_store_errors_mapping() {
    let id = Uuid::new_v4();
    assert_eq!(VerificationError::from(StoreError::NotFound { id }), VerificationError::NotFound);
    assert!(matches!(
        VerificationError::from(StoreError::Unavailable { message: "down".into() }),
        VerificationError::Unavailable { .. }
    ));
    assert!(matches!(
        VerificationError::from(StoreError::Corrupt { message: "bad purpose".into() }),
        VerificationError::Internal { .. }
    ));
}

#[test]
fn test_only_transient_errors_are_retryable() {
    assert!(VerificationError::Unavailable { message: String::new() }.is_retryable());
    assert!(VerificationError::RateLimited { retry_after_seconds: 3 }.is_retryable());
    assert!(!VerificationError::TokenExpired.is_retryable());
    assert!(!VerificationError::SecretMismatch { remaining_attempts: 1 }.is_retryable());
    assert!(!VerificationError::AlreadyFinalized {
        state: VerificationState::Verified,
        subject_id: "u1".into(),
        purpose: Purpose::EmailConfirm,
    }
    .is_retryable());
}

#[test]
fn test_error_codes_are_stable() {
    assert_eq!(VerificationError::TokenExpired.error_code(), "TOKEN_EXPIRED");
    assert_eq!(VerificationError::TooManyAttempts.error_code(), "TOO_MANY_ATTEMPTS");
    assert_eq!(
        VerificationError::DeliveryFailed { request_id: Uuid::nil(), reason: "smtp".into() }.error_code(),
        "DELIVERY_FAILED"
    );
}

#[test]
fn test_store_transience() {
    assert!(StoreError::Unavailable { message: "timeout".into() }.is_transient());
    assert!(!StoreError::StateConflict { current: VerificationState::Revoked }.is_transient());
}
