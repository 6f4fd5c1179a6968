//! Notifier construction from configuration

use vt_core::Purpose;
use vt_shared::NotifierConfig;

use super::delivery;
use crate::notify::create_notifier;
use crate::InfrastructureError;

#[tokio::test]
async fn test_default_config_builds_mock_router() {
    let notifier = create_notifier(&NotifierConfig::default()).unwrap();
    assert_eq!(notifier.channel_name(), "router");

    let email_id = notifier.deliver(&delivery(Purpose::EmailConfirm, "a@example.com")).await.unwrap();
    let sms_id = notifier.deliver(&delivery(Purpose::PhoneConfirm, "+14155552671")).await.unwrap();
    assert!(email_id.starts_with("email-mock-"));
    assert!(sms_id.starts_with("sms-mock-"));
}

#[test]
fn test_unknown_provider_rejected() {
    let mut config = NotifierConfig::default();
    config.email.provider = "carrier-pigeon".to_string();

    assert!(matches!(create_notifier(&config), Err(InfrastructureError::Config(_))));
}

#[test]
fn test_http_provider_requires_api_key() {
    let mut config = NotifierConfig::default();
    config.email.provider = "http".to_string();
    config.email.api_key = String::new();

    assert!(matches!(create_notifier(&config), Err(InfrastructureError::Config(_))));
}

#[test]
fn test_backup_url_without_key_rejected() {
    let mut config = NotifierConfig::default();
    config.email.provider = "http".to_string();
    config.email.api_key = "primary-key".to_string();
    config.email.backup_api_url = Some("https://backup.example.com/send".to_string());

    assert!(matches!(create_notifier(&config), Err(InfrastructureError::Config(_))));
}

#[test]
fn test_http_provider_with_backup_builds() {
    let mut config = NotifierConfig::default();
    config.email.provider = "http".to_string();
    config.email.api_key = "primary-key".to_string();
    config.email.backup_api_url = Some("https://backup.example.com/send".to_string());
    config.email.backup_api_key = Some("backup-key".to_string());

    assert!(create_notifier(&config).is_ok());
}
