//! End-to-end lifecycle through the public API of the core crate

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};

use vt_core::{
    Delivery, ExpirySweepConfig, ExpirySweeper, InMemoryVerificationStore, IssueRequest, ManualClock, Purpose,
    TokenCodec, VerificationEngine, VerificationError, VerificationNotifier,
    VerificationServiceConfig, VerificationState,
};
use vt_shared::SigningConfig;

/// Notifier keeping the last delivered token so the test can play the subject
#[derive(Default)]
struct Inbox {
    tokens: Mutex<Vec<String>>,
}

impl Inbox {
    fn last(&self) -> String {
        self.tokens.lock().unwrap().last().cloned().expect("no delivery")
    }
}

#[async_trait]
impl VerificationNotifier for Inbox {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        self.tokens.lock().unwrap().push(delivery.token.clone());
        Ok(format!("inbox-{}", delivery.request_id))
    }

    fn channel_name(&self) -> &str {
        "inbox"
    }
}

fn engine() -> (
    VerificationEngine<InMemoryVerificationStore>,
    Arc<InMemoryVerificationStore>,
    Arc<ManualClock>,
) {
    let signing = SigningConfig::new("k1", "integration-signing-key-0123456789abcdef");
    let codec = TokenCodec::from_config(&signing).unwrap();
    let store = Arc::new(InMemoryVerificationStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = VerificationEngine::new(store.clone(), codec, VerificationServiceConfig::default())
        .with_clock(clock.clone());
    (engine, store, clock)
}

#[tokio::test]
async fn test_email_confirmation_lifecycle() {
    let (engine, _store, _clock) = engine();
    let inbox = Inbox::default();

    let issued = engine
        .issue(
            IssueRequest::new("user-42", Purpose::EmailConfirm).with_destination("user42@example.com"),
            &inbox,
        )
        .await
        .unwrap();
    assert_eq!(issued.message_id, format!("inbox-{}", issued.request_id));

    let confirmed = engine.confirm(&inbox.last()).await.unwrap();
    assert_eq!(confirmed.request_id, issued.request_id);
    assert_eq!(confirmed.subject_id, "user-42");

    let replay = engine.confirm(&inbox.last()).await.unwrap_err();
    assert!(matches!(replay, VerificationError::AlreadyFinalized { state: VerificationState::Verified, .. }));

    let status = engine.status(issued.request_id).await.unwrap();
    assert_eq!(status.state, VerificationState::Verified);
    assert!(status.finalized_at.is_some());
}

#[tokio::test]
async fn test_reissue_invalidates_previous_token() {
    let (engine, _store, _clock) = engine();
    let inbox = Inbox::default();

    let first = engine
        .issue(IssueRequest::new("user-7", Purpose::PasswordReset), &inbox)
        .await
        .unwrap();
    let first_token = inbox.last();

    engine
        .reissue(IssueRequest::new("user-7", Purpose::PasswordReset), &inbox)
        .await
        .unwrap();

    let err = engine.confirm(&first_token).await.unwrap_err();
    assert!(matches!(err, VerificationError::AlreadyFinalized { state: VerificationState::Revoked, .. }));
    assert_eq!(engine.status(first.request_id).await.unwrap().state, VerificationState::Revoked);

    assert!(engine.confirm(&inbox.last()).await.is_ok());
}

#[tokio::test]
async fn test_sweep_expires_and_confirm_reports_expiry() {
    let (engine, store, clock) = engine();
    let inbox = Inbox::default();

    let issued = engine
        .issue(
            IssueRequest::new("user-9", Purpose::AccountAction).with_ttl(Duration::minutes(5)),
            &inbox,
        )
        .await
        .unwrap();

    clock.advance(Duration::minutes(6));
    let sweeper = ExpirySweeper::new(store, ExpirySweepConfig::default()).with_clock(clock.clone());
    let result = sweeper.run_once().await;
    assert_eq!(result.expired, 1);

    let err = engine.confirm(&inbox.last()).await.unwrap_err();
    assert_eq!(err, VerificationError::TokenExpired);
    assert_eq!(engine.status(issued.request_id).await.unwrap().state, VerificationState::Expired);
}
