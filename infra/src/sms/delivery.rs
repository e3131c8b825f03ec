//! Queued verification code delivery
//!
//! Request handlers only push onto an unbounded channel; a background worker
//! sends the SMS with bounded retries so slow providers never hold up a
//! response.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use qs_core::errors::{DomainError, DomainResult};
use qs_core::CodeDelivery;
use qs_shared::config::SmsConfig;
use qs_shared::utils::phone::mask_phone_number;

use super::sms_service::SmsService;

/// Upper bound for the backoff between send attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// A code waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub phone: String,
    pub code: String,
}

/// Producer side of the delivery queue
#[derive(Clone)]
pub struct SmsDeliveryQueue {
    sender: mpsc::UnboundedSender<DeliveryRequest>,
}

impl SmsDeliveryQueue {
    /// Create a queue and the worker that drains it
    ///
    /// The worker stops once every queue handle is dropped and the backlog
    /// is sent.
    pub fn channel(
        sms: Arc<dyn SmsService>,
        config: &SmsConfig,
        code_ttl_minutes: u64,
    ) -> (Self, SmsDeliveryWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = SmsDeliveryWorker {
            receiver,
            sms,
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            code_ttl_minutes,
        };
        (Self { sender }, worker)
    }
}

impl CodeDelivery for SmsDeliveryQueue {
    fn enqueue_delivery(&self, phone: &str, code: &str) -> DomainResult<()> {
        self.sender
            .send(DeliveryRequest {
                phone: phone.to_string(),
                code: code.to_string(),
            })
            .map_err(|_| DomainError::DeliveryFailure {
                message: "SMS delivery worker has stopped".to_string(),
            })
    }
}

/// Consumer side of the delivery queue
pub struct SmsDeliveryWorker {
    receiver: mpsc::UnboundedReceiver<DeliveryRequest>,
    sms: Arc<dyn SmsService>,
    max_attempts: u32,
    retry_delay: Duration,
    code_ttl_minutes: u64,
}

impl SmsDeliveryWorker {
    /// Run the worker on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Send queued codes until the queue is closed
    pub async fn run(mut self) {
        tracing::info!(provider = self.sms.provider_name(), "SMS delivery worker started");

        while let Some(request) = self.receiver.recv().await {
            self.deliver(&request).await;
        }

        tracing::info!("SMS delivery worker stopped");
    }

    /// Send one code, retrying with exponential backoff
    ///
    /// Returns whether the provider accepted the message.
    pub async fn deliver(&self, request: &DeliveryRequest) -> bool {
        let masked_phone = mask_phone_number(&request.phone);
        let mut delay = self.retry_delay;

        for attempt in 1..=self.max_attempts {
            match self
                .sms
                .send_verification_code(&request.phone, &request.code, self.code_ttl_minutes)
                .await
            {
                Ok(message_id) => {
                    tracing::info!(
                        phone = %masked_phone,
                        message_id = %message_id,
                        attempt = attempt,
                        event = "otp_delivered",
                        "Verification code delivered"
                    );
                    return true;
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        phone = %masked_phone,
                        error = %e,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        "SMS send failed, retrying in {}ms",
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_millis(MAX_RETRY_DELAY_MS));
                }
                Err(e) => {
                    tracing::error!(
                        phone = %masked_phone,
                        error = %e,
                        attempts = attempt,
                        event = "otp_delivery_failed",
                        "Giving up on verification code delivery"
                    );
                }
            }
        }

        false
    }
}
