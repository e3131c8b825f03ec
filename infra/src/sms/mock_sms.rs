//! Mock SMS Service Implementation
//!
//! Logs messages instead of sending them. Used in development and tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use qs_shared::utils::phone::{is_valid_mobile, mask_phone_number};

use super::sms_service::SmsService;
use crate::InfrastructureError;

/// Mock SMS service for development and testing
///
/// Can fail a given number of sends before succeeding, to exercise retries.
#[derive(Clone, Default)]
pub struct MockSmsService {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Number of send attempts, failed ones included
    attempt_count: Arc<AtomicU64>,
    /// Sends left to fail before succeeding
    failures_left: Arc<AtomicU32>,
    /// Delivered (phone, message) pairs
    outbox: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` sends
    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Number of send attempts, including failed ones
    pub fn get_attempt_count(&self) -> u64 {
        self.attempt_count.load(Ordering::SeqCst)
    }

    /// Messages delivered so far
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.outbox.lock().map(|outbox| outbox.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError> {
        self.attempt_count.fetch_add(1, Ordering::SeqCst);
        let masked_phone = mask_phone_number(phone_number);

        if !is_valid_mobile(phone_number) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                masked_phone
            )));
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            warn!(phone = %masked_phone, "Mock SMS service simulating failure");
            return Err(InfrastructureError::Sms(
                "Simulated SMS sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push((phone_number.to_string(), message.to_string()));
        }

        info!(
            target: "sms_service",
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            message_length = message.len(),
            "SMS sent successfully (mock)"
        );
        debug!(target: "sms_service", content = %message, "Mock SMS content");

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
