//! SMS Service Interface

use async_trait::async_trait;

use crate::InfrastructureError;

/// Text of the verification SMS
pub fn verification_message(code: &str, expires_in_minutes: u64) -> String {
    format!(
        "Your QuickSign verification code is: {}. It expires in {} minutes.",
        code, expires_in_minutes
    )
}

/// SMS service trait for sending text messages
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send an SMS message to a phone number
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(InfrastructureError::Sms)` - If sending fails
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError>;

    /// Send a verification code via SMS
    async fn send_verification_code(
        &self,
        phone_number: &str,
        code: &str,
        expires_in_minutes: u64,
    ) -> Result<String, InfrastructureError> {
        self.send_sms(phone_number, &verification_message(code, expires_in_minutes))
            .await
    }

    /// Get the service provider name
    fn provider_name(&self) -> &str;
}
