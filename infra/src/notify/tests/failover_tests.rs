//! Failover between two notifier channels

use std::sync::Arc;
use std::time::{Duration, Instant};
use vt_core::{Purpose, VerificationNotifier};

use super::delivery;
use crate::notify::{FailoverNotifier, MockNotifier};

#[tokio::test]
async fn test_failover_to_backup() {
    let backup = MockNotifier::new("backup");
    let notifier = FailoverNotifier::new(
        Arc::new(MockNotifier::failing("primary", "503 from provider")),
        Arc::new(backup.clone()),
        Duration::from_secs(30),
    );

    let result = notifier.deliver(&delivery(Purpose::EmailConfirm, "a@example.com")).await;

    assert!(result.unwrap().starts_with("backup-"));
    assert!(notifier.is_using_backup().await);
    assert_eq!(notifier.state.read().await.primary_failure_count, 1);
    assert_eq!(backup.delivery_count(), 1);
}

#[tokio::test]
async fn test_stays_on_backup_until_timeout() {
    let primary = MockNotifier::new("primary");
    let notifier = FailoverNotifier::new(
        Arc::new(primary.clone()),
        Arc::new(MockNotifier::new("backup")),
        Duration::from_secs(30),
    );
    {
        let mut state = notifier.state.write().await;
        state.using_backup = true;
        state.last_primary_failure = Some(Instant::now());
    }

    let message_id = notifier
        .deliver(&delivery(Purpose::EmailConfirm, "a@example.com"))
        .await
        .unwrap();

    assert!(message_id.starts_with("backup-"));
    assert_eq!(primary.delivery_count(), 0);
}

#[tokio::test]
async fn test_backup_failure_names_primary_only_when_tried() {
    let notifier = FailoverNotifier::new(
        Arc::new(MockNotifier::failing("primary", "503 from provider")),
        Arc::new(MockNotifier::failing("backup", "quota exceeded")),
        Duration::from_secs(30),
    );

    let first = notifier
        .deliver(&delivery(Purpose::EmailConfirm, "a@example.com"))
        .await
        .unwrap_err();
    assert!(first.starts_with("Both primary (primary) and backup (backup)"), "got {first}");

    // Primary is now inside its failover window and is skipped
    let second = notifier
        .deliver(&delivery(Purpose::EmailConfirm, "a@example.com"))
        .await
        .unwrap_err();
    assert!(!second.contains("Both"), "got {second}");
    assert!(second.contains("in failover"), "got {second}");
    assert!(second.contains("quota exceeded"));
}

#[tokio::test]
async fn test_primary_recovery() {
    let notifier = FailoverNotifier::new(
        Arc::new(MockNotifier::new("primary")),
        Arc::new(MockNotifier::new("backup")),
        Duration::from_millis(100),
    );
    {
        let mut state = notifier.state.write().await;
        state.using_backup = true;
        state.last_primary_failure = Some(Instant::now() - Duration::from_secs(1));
    }

    let message_id = notifier
        .deliver(&delivery(Purpose::EmailConfirm, "a@example.com"))
        .await
        .unwrap();

    assert!(message_id.starts_with("primary-"));
    assert!(!notifier.is_using_backup().await);
}

#[tokio::test]
async fn test_both_channels_fail() {
    let notifier = FailoverNotifier::new(
        Arc::new(MockNotifier::failing("primary", "down")),
        Arc::new(MockNotifier::failing("backup", "also down")),
        Duration::from_secs(30),
    );

    let err = notifier
        .deliver(&delivery(Purpose::EmailConfirm, "a@example.com"))
        .await
        .unwrap_err();

    assert!(err.contains("Both primary (primary) and backup (backup)"));
    assert!(err.contains("also down"));
}
