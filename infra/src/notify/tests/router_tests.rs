//! Purpose based routing

use std::sync::Arc;
use vt_core::{Purpose, VerificationNotifier};

use super::delivery;
use crate::notify::{MockNotifier, NotifierRouter};

#[tokio::test]
async fn test_phone_confirmation_goes_to_sms() {
    let email = MockNotifier::new("email-mock");
    let sms = MockNotifier::new("sms-mock");
    let router = NotifierRouter::new(Arc::new(email.clone()), Arc::new(sms.clone()));

    let message_id = router.deliver(&delivery(Purpose::PhoneConfirm, "+14155552671")).await.unwrap();

    assert!(message_id.starts_with("sms-mock-"));
    assert_eq!(sms.delivery_count(), 1);
    assert_eq!(email.delivery_count(), 0);
}

#[tokio::test]
async fn test_other_purposes_go_to_email() {
    let email = MockNotifier::new("email-mock");
    let sms = MockNotifier::new("sms-mock");
    let router = NotifierRouter::new(Arc::new(email.clone()), Arc::new(sms.clone()));

    for purpose in [Purpose::EmailConfirm, Purpose::PasswordReset, Purpose::AccountAction] {
        router.deliver(&delivery(purpose, "alice@example.com")).await.unwrap();
    }

    assert_eq!(email.delivery_count(), 3);
    assert_eq!(sms.delivery_count(), 0);
    assert_eq!(email.deliveries()[0].destination, "alice@example.com");
}

#[tokio::test]
async fn test_channel_error_is_passed_through() {
    let router = NotifierRouter::new(
        Arc::new(MockNotifier::failing("email-mock", "mailbox full")),
        Arc::new(MockNotifier::new("sms-mock")),
    );

    let err = router.deliver(&delivery(Purpose::EmailConfirm, "a@b.c")).await.unwrap_err();
    assert_eq!(err, "mailbox full");
}
