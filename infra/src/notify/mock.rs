//! Mock notifier for development and tests
//!
//! Logs each delivery with a masked destination and keeps a copy in memory.
//! Never use it in production: tokens are readable through `deliveries()`.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vt_core::{Delivery, VerificationNotifier};
use vt_shared::mask_destination;

/// Mock notifier that records deliveries
#[derive(Clone)]
pub struct MockNotifier {
    name: String,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    fail_with: Option<String>,
}

impl MockNotifier {
    /// Create a mock channel with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deliveries: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// A channel that rejects every delivery with `reason`
    pub fn failing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::new(name)
        }
    }

    /// Deliveries accepted so far
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().map(|d| d.len()).unwrap_or(0)
    }
}

#[async_trait]
impl VerificationNotifier for MockNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<String, String> {
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }

        let message_id = format!("{}-{}", self.name, Uuid::new_v4());
        tracing::info!(
            channel = %self.name,
            request_id = %delivery.request_id,
            destination = %mask_destination(&delivery.destination),
            purpose = %delivery.purpose,
            message_id = %message_id,
            "[MOCK] Verification delivered"
        );

        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push(delivery.clone());
        }
        Ok(message_id)
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}
