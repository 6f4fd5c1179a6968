//! HTTP e-mail channel
//!
//! Sends transactional mail through a JSON API in the Brevo format
//! (`POST` with an `api-key` header). The token is embedded in a link to the
//! client's verification route.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};
use vt_core::{Delivery, VerificationNotifier};
use vt_shared::{mask_destination, EmailConfig};

use super::message;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendEmailBody {
    pub sender: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailResponse {
    message_id: Option<String>,
}

/// E-mail notifier backed by an HTTP mail API
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    config: EmailConfig,
    name: String,
}

impl HttpEmailNotifier {
    /// Create a notifier for the primary mail API in `config`
    pub fn new(config: EmailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config.api_url.clone();
        let api_key = config.api_key.clone();
        Self::with_endpoint(config, api_url, api_key, "email")
    }

    /// Create a notifier for the backup mail API, if one is configured
    pub fn backup(config: &EmailConfig) -> Result<Option<Self>, InfrastructureError> {
        match (&config.backup_api_url, &config.backup_api_key) {
            (Some(url), Some(key)) => Self::with_endpoint(config.clone(), url.clone(), key.clone(), "email-backup").map(Some),
            (Some(_), None) => Err(InfrastructureError::Config(
                "MAIL_BACKUP_API_KEY is required when MAIL_BACKUP_API_URL is set".to_string(),
            )),
            _ => Ok(None),
        }
    }

    fn with_endpoint(
        config: EmailConfig,
        api_url: String,
        api_key: String,
        name: &str,
    ) -> Result<Self, InfrastructureError> {
        if api_key.trim().is_empty() {
            return Err(InfrastructureError::Config("MAIL_API_KEY is required".to_string()));
        }
        if config.sender_email.trim().is_empty() {
            return Err(InfrastructureError::Config("SENDER_EMAIL is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        info!(api_url = %api_url, channel = name, "HTTP e-mail notifier initialized");

        Ok(Self {
            client,
            api_url,
            api_key,
            config,
            name: name.to_string(),
        })
    }

    pub(crate) fn build_body(&self, delivery: &Delivery) -> SendEmailBody {
        let link = message::verification_link(&self.config.verify_url, &delivery.token);
        SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: delivery.destination.clone(),
                name: None,
            }],
            subject: message::subject(delivery.purpose).to_string(),
            html_content: message::email_html(delivery, &link),
            text_content: message::email_text(delivery, &link),
        }
    }
}

#[async_trait]
impl VerificationNotifier for HttpEmailNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        let body = self.build_body(delivery);

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, channel = %self.name, "Mail API request failed");
                format!("Mail API request failed: {}", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), channel = %self.name, "Mail API rejected the message");
            return Err(format!("Mail API send failed (status={}): {}", status.as_u16(), text));
        }

        let message_id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.message_id)
            .unwrap_or_else(|| format!("email-{}", delivery.request_id));

        info!(
            request_id = %delivery.request_id,
            destination = %mask_destination(&delivery.destination),
            message_id = %message_id,
            channel = %self.name,
            "Verification e-mail sent"
        );
        Ok(message_id)
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}
