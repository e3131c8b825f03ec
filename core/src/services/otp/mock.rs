//! Mock delivery channel for testing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::errors::{DomainError, DomainResult};

use super::delivery::CodeDelivery;

/// Records queued codes instead of sending them
#[derive(Default)]
pub struct MockCodeDelivery {
    sent: Mutex<Vec<(String, String)>>,
    closed: AtomicBool,
}

impl MockCodeDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every enqueue fail as if the queue were closed
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code.clone())
    }
}

impl CodeDelivery for MockCodeDelivery {
    fn enqueue_delivery(&self, phone: &str, code: &str) -> DomainResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::DeliveryFailure {
                message: "delivery queue closed".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}
