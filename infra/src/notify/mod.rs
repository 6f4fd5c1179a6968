//! Notifier gateways
//!
//! Implementations of `vt_core::VerificationNotifier`:
//!
//! - **Mock**: logs and records deliveries, for development
//! - **HTTP e-mail**: transactional mail API with an `api-key` header
//! - **Twilio SMS**: behind the `twilio-sms` feature
//! - **Failover**: primary/backup pair with recovery timeout
//! - **Router**: picks the SMS channel for phone confirmations and e-mail otherwise

pub mod email;
pub mod failover;
pub mod message;
pub mod mock;
pub mod phone;
pub mod router;

#[cfg(feature = "twilio-sms")]
pub mod twilio;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;
use vt_core::VerificationNotifier;
use vt_shared::NotifierConfig;

use crate::InfrastructureError;

pub use email::HttpEmailNotifier;
pub use failover::FailoverNotifier;
pub use mock::MockNotifier;
pub use phone::to_e164;
pub use router::NotifierRouter;

#[cfg(feature = "twilio-sms")]
pub use twilio::TwilioSmsNotifier;

/// Build the notifier described by the configuration
///
/// The e-mail channel is wrapped in a [`FailoverNotifier`] when a backup
/// mail API is configured. Both channels are combined in a [`NotifierRouter`].
///
/// # Returns
///
/// * `Ok(Arc<dyn VerificationNotifier>)` - The routed notifier
/// * `Err(InfrastructureError::Config)` - Unknown provider or missing credentials
pub fn create_notifier(config: &NotifierConfig) -> Result<Arc<dyn VerificationNotifier>, InfrastructureError> {
    let email = create_email_channel(config)?;
    let sms = create_sms_channel(config)?;

    tracing::info!(
        email = email.channel_name(),
        sms = sms.channel_name(),
        "Notifier channels configured"
    );

    Ok(Arc::new(NotifierRouter::new(email, sms)))
}

fn create_email_channel(config: &NotifierConfig) -> Result<Arc<dyn VerificationNotifier>, InfrastructureError> {
    match config.email.provider.as_str() {
        "mock" => Ok(Arc::new(MockNotifier::new("email-mock"))),
        "http" | "brevo" => {
            let primary: Arc<dyn VerificationNotifier> = Arc::new(HttpEmailNotifier::new(config.email.clone())?);
            match HttpEmailNotifier::backup(&config.email)? {
                Some(backup) => Ok(Arc::new(FailoverNotifier::new(
                    primary,
                    Arc::new(backup),
                    Duration::from_secs(config.failover_timeout_secs),
                ))),
                None => Ok(primary),
            }
        }
        other => Err(InfrastructureError::Config(format!("Unknown e-mail provider: {}", other))),
    }
}

fn create_sms_channel(config: &NotifierConfig) -> Result<Arc<dyn VerificationNotifier>, InfrastructureError> {
    match config.sms.provider.as_str() {
        "mock" => Ok(Arc::new(MockNotifier::new("sms-mock"))),
        #[cfg(feature = "twilio-sms")]
        "twilio" => Ok(Arc::new(TwilioSmsNotifier::new(&config.sms, config.email.verify_url.clone())?)),
        #[cfg(not(feature = "twilio-sms"))]
        "twilio" => Err(InfrastructureError::Config(
            "SMS_PROVIDER=twilio requires the twilio-sms feature".to_string(),
        )),
        other => Err(InfrastructureError::Config(format!("Unknown SMS provider: {}", other))),
    }
}
