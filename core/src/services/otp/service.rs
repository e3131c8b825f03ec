//! OTP service implementation

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};

use qs_shared::config::OtpConfig;
use qs_shared::utils::phone::mask_phone_number;

use crate::cache::{keys, lock, CacheResult, CacheStore};
use crate::errors::DomainResult;

use super::delivery::CodeDelivery;
use super::types::OtpDispatch;

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Issues verification codes and validates them exactly once
pub struct OtpService<C, D>
where
    C: CacheStore + ?Sized + 'static,
    D: CodeDelivery + ?Sized,
{
    cache: Arc<C>,
    delivery: Arc<D>,
    config: OtpConfig,
}

impl<C, D> OtpService<C, D>
where
    C: CacheStore + ?Sized + 'static,
    D: CodeDelivery + ?Sized,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `cache` - Shared cache store holding codes and validation locks
    /// * `delivery` - Channel the generated codes are queued on
    /// * `config` - Code lifetime and lock settings
    pub fn new(cache: Arc<C>, delivery: Arc<D>, config: OtpConfig) -> Self {
        Self {
            cache,
            delivery,
            config,
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Generate a fresh code for `phone` and store it, replacing any previous one
    pub async fn generate_code(&self, phone: &str) -> DomainResult<String> {
        let code = OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string();

        self.cache
            .set(&keys::verification_code(phone), &code, self.config.code_ttl())
            .await?;

        tracing::info!(
            phone = %mask_phone_number(phone),
            ttl_seconds = self.config.code_ttl_seconds,
            event = "otp_generated",
            "Generated new verification code"
        );

        Ok(code)
    }

    /// Generate a code and queue it for delivery
    ///
    /// Returns as soon as the code is stored and queued. A delivery channel
    /// that refuses the code is logged; the stored code stays valid.
    pub async fn send_otp_code(&self, phone: &str) -> DomainResult<OtpDispatch> {
        let code = self.generate_code(phone).await?;

        if let Err(e) = self.delivery.enqueue_delivery(phone, &code) {
            tracing::error!(
                phone = %mask_phone_number(phone),
                error = %e,
                event = "otp_delivery_failed",
                "Failed to queue verification code for delivery"
            );
        }

        Ok(OtpDispatch {
            status: "success".to_string(),
            message: format!("Verification code sent to {}", phone),
            retry_after: self.config.retry_after_seconds,
        })
    }

    /// Check a submitted code, consuming it on a match
    ///
    /// Validation for one phone number is serialized through a lock in the
    /// cache store, so a code is accepted at most once across all workers.
    /// Store failures and lock timeouts are logged and count as a mismatch.
    pub async fn validate_code(&self, phone: &str, submitted: &str) -> bool {
        if !is_code_format(submitted) {
            tracing::debug!(
                phone = %mask_phone_number(phone),
                event = "otp_malformed",
                "Rejected malformed verification code"
            );
            return false;
        }

        match self.consume_code(phone, submitted).await {
            Ok(matched) => {
                tracing::info!(
                    phone = %mask_phone_number(phone),
                    matched = matched,
                    event = "otp_validated",
                    "Verification code checked"
                );
                matched
            }
            Err(e) => {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "otp_validation_error",
                    "Verification code check failed"
                );
                false
            }
        }
    }

    async fn consume_code(&self, phone: &str, submitted: &str) -> CacheResult<bool> {
        let guard = lock::acquire(
            Arc::clone(&self.cache),
            &keys::otp_lock(phone),
            self.config.lock_lease(),
            self.config.lock_wait(),
        )
        .await?;

        let outcome = self.compare_and_delete(phone, submitted).await;

        if let Err(e) = guard.release().await {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                error = %e,
                "Failed to release validation lock"
            );
        }

        outcome
    }

    async fn compare_and_delete(&self, phone: &str, submitted: &str) -> CacheResult<bool> {
        let key = keys::verification_code(phone);

        let Some(stored) = self.cache.get(&key).await? else {
            return Ok(false);
        };

        if !constant_time_eq(stored.as_bytes(), submitted.as_bytes()) {
            return Ok(false);
        }

        // Only the caller that removes the code wins, even if the lease ran out
        self.cache.delete(&key).await
    }
}

pub(crate) fn is_code_format(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
