//! Purpose-based routing between the e-mail and SMS channels

use async_trait::async_trait;
use std::sync::Arc;
use vt_core::{Delivery, Purpose, VerificationNotifier};

/// Sends phone confirmations by SMS and everything else by e-mail
pub struct NotifierRouter {
    email: Arc<dyn VerificationNotifier>,
    sms: Arc<dyn VerificationNotifier>,
}

impl NotifierRouter {
    pub fn new(email: Arc<dyn VerificationNotifier>, sms: Arc<dyn VerificationNotifier>) -> Self {
        Self { email, sms }
    }

    /// Channel responsible for a purpose
    pub fn channel_for(&self, purpose: Purpose) -> &Arc<dyn VerificationNotifier> {
        match purpose {
            Purpose::PhoneConfirm => &self.sms,
            Purpose::EmailConfirm | Purpose::PasswordReset | Purpose::AccountAction => &self.email,
        }
    }
}

#[async_trait]
impl VerificationNotifier for NotifierRouter {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        let channel = self.channel_for(delivery.purpose);
        tracing::debug!(
            request_id = %delivery.request_id,
            purpose = %delivery.purpose,
            channel = channel.channel_name(),
            "Routing verification delivery"
        );
        channel.deliver(delivery).await
    }

    fn channel_name(&self) -> &str {
        "router"
    }
}
