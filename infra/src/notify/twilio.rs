//! Twilio SMS channel
//!
//! Sends the verification link by SMS. Destinations are normalized to
//! E.164 before the API call; transient API failures are retried with
//! exponential backoff.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};
use vt_core::{Delivery, VerificationNotifier};
use vt_shared::{mask_destination, SmsConfig};

use super::message;
use super::phone::to_e164;
use crate::InfrastructureError;

/// Twilio SMS notifier
pub struct TwilioSmsNotifier {
    client: Client,
    from_number: String,
    verify_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl TwilioSmsNotifier {
    /// Create a new Twilio notifier
    ///
    /// # Arguments
    ///
    /// * `config` - Account credentials and sending number
    /// * `verify_url` - Client route the SMS link points to
    pub fn new(config: &SmsConfig, verify_url: impl Into<String>) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN are required".to_string(),
            ));
        }
        let from_number = to_e164(&config.from_number).map_err(|e| {
            InfrastructureError::Config(format!("TWILIO_FROM_NUMBER is not a valid E.164 number: {}", e))
        })?;

        info!(from = %mask_destination(&from_number), "Twilio SMS notifier initialized");

        Ok(Self {
            client: Client::new(&config.account_sid, &config.auth_token),
            from_number,
            verify_url: verify_url.into(),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, String> {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            debug!(attempt = attempts, to = %mask_destination(to), "Sending SMS");

            let outbound = OutboundMessage::new(&self.from_number, to, body);
            match self.client.send_message(outbound).await {
                Ok(response) => return Ok(response.sid),
                Err(e) => {
                    let reason = e.to_string();
                    error!(attempt = attempts, error = %reason, "Failed to send SMS");

                    if attempts >= self.max_retries || !is_retryable(&reason) {
                        return Err(format!("Failed to send SMS after {} attempts: {}", attempts, reason));
                    }

                    warn!(delay_ms = delay.as_millis() as u64, "Retrying SMS delivery");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl VerificationNotifier for TwilioSmsNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        let to = to_e164(&delivery.destination)?;
        let link = message::verification_link(&self.verify_url, &delivery.token);
        let sid = self.send_with_retry(&to, &message::sms_text(delivery, &link)).await?;

        info!(
            request_id = %delivery.request_id,
            destination = %mask_destination(&to),
            message_id = %sid,
            "Verification SMS sent"
        );
        Ok(sid)
    }

    fn channel_name(&self) -> &str {
        "twilio"
    }
}

/// Rate limiting and server side errors are worth another try; client errors are not
fn is_retryable(reason: &str) -> bool {
    ["429", "500", "502", "503", "504", "timed out", "connection"]
        .iter()
        .any(|marker| reason.contains(marker))
}
