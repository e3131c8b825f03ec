//! SMS Service Module
//!
//! Provider trait, the mock provider, and the queue that decouples code
//! delivery from request handling.

pub mod delivery;
pub mod mock_sms;
pub mod sms_service;

pub use delivery::{DeliveryRequest, SmsDeliveryQueue, SmsDeliveryWorker};
pub use mock_sms::MockSmsService;
pub use sms_service::{verification_message, SmsService};

use std::sync::Arc;

use qs_shared::config::SmsConfig;

#[cfg(test)]
mod tests;

/// Create an SMS service based on configuration
///
/// Unknown providers fall back to the mock implementation.
pub fn create_sms_service(config: &SmsConfig) -> Arc<dyn SmsService> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsService::new()),
        _ => {
            tracing::warn!(
                "Unknown SMS provider '{}', using mock implementation",
                config.provider
            );
            Arc::new(MockSmsService::new())
        }
    }
}
