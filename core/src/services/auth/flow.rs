//! Authentication flow implementation

use std::sync::Arc;

use qs_shared::config::BlockPolicyConfig;
use qs_shared::utils::phone::{is_valid_mobile, mask_phone_number, PHONE_FORMAT_MESSAGE};

use crate::cache::CacheStore;
use crate::errors::{DomainError, DomainResult};
use crate::services::block::{BlockService, Identity};
use crate::services::otp::{is_code_format, CodeDelivery, OtpService};
use crate::services::throttle::{RequestThrottle, ThrottleStatus};

use super::config::AuthFlowConfig;
use super::traits::{CredentialVerifier, UserDirectory};
use super::types::{LoginOutcome, PhoneCheckOutcome, RegisterOutcome};

/// Throttle scope of phone status checks
pub const PHONE_CHECK_SCOPE: &str = "phone_check";

/// Message returned when a submitted verification code is malformed
pub const CODE_FORMAT_MESSAGE: &str = "Verification code must be exactly 6 digits";

/// Message returned while an identity is blocked
pub const BLOCKED_MESSAGE: &str = "Account temporarily blocked due to too many attempts";

/// Message shown after a failed attempt
///
/// Warns how many attempts are left, or that the account is now blocked.
pub fn failure_message(remaining_attempts: u32, policy: &BlockPolicyConfig) -> String {
    if remaining_attempts > 0 {
        format!(
            "Account will be blocked after {} more failed attempts",
            remaining_attempts
        )
    } else {
        format!(
            "Account blocked for {} minutes",
            policy.block_duration_minutes()
        )
    }
}

/// Phone-based login and registration
///
/// Every entry point checks blocks first; failed passwords and codes count
/// against the caller's identity and a success clears the count.
pub struct AuthFlow<C, D, U, V>
where
    C: CacheStore + ?Sized + 'static,
    D: CodeDelivery + ?Sized,
    U: UserDirectory + ?Sized,
    V: CredentialVerifier + ?Sized,
{
    block_service: BlockService<C>,
    otp_service: OtpService<C, D>,
    throttle: RequestThrottle<C>,
    users: Arc<U>,
    verifier: Arc<V>,
}

impl<C, D, U, V> AuthFlow<C, D, U, V>
where
    C: CacheStore + ?Sized + 'static,
    D: CodeDelivery + ?Sized,
    U: UserDirectory + ?Sized,
    V: CredentialVerifier + ?Sized,
{
    /// Create a new authentication flow
    ///
    /// # Arguments
    ///
    /// * `cache` - Shared cache store for blocks, codes and throttle counters
    /// * `delivery` - Channel verification codes are queued on
    /// * `users` - Registered user lookup
    /// * `verifier` - Password check
    /// * `config` - Block policy, throttle and OTP settings
    pub fn new(
        cache: Arc<C>,
        delivery: Arc<D>,
        users: Arc<U>,
        verifier: Arc<V>,
        config: AuthFlowConfig,
    ) -> Self {
        Self {
            block_service: BlockService::new(Arc::clone(&cache), config.rate_limit.block),
            otp_service: OtpService::new(Arc::clone(&cache), delivery, config.otp),
            throttle: RequestThrottle::new(cache, config.rate_limit.phone_check),
            users,
            verifier,
        }
    }

    pub fn block_service(&self) -> &BlockService<C> {
        &self.block_service
    }

    pub fn otp_service(&self) -> &OtpService<C, D> {
        &self.otp_service
    }

    /// Decide how a client continues with `phone`
    ///
    /// Unknown phone numbers get a verification code right away.
    pub async fn check_phone(&self, phone: &str, ip: Option<&str>) -> DomainResult<PhoneCheckOutcome> {
        // Malformed requests count against the throttle too
        if let ThrottleStatus::Throttled { retry_after } =
            self.throttle.check(PHONE_CHECK_SCOPE, ip, Some(phone.trim())).await?
        {
            return Ok(PhoneCheckOutcome::Throttled { retry_after });
        }

        let phone = validate_phone(phone)?;

        let identity = Identity::new(Some(phone), ip);
        if let Some(remaining_minutes) = self.blocked_minutes(&identity).await? {
            return Ok(PhoneCheckOutcome::Blocked {
                remaining_minutes,
                message: BLOCKED_MESSAGE.to_string(),
            });
        }

        if let Some(user) = self.users.find_by_phone(phone).await? {
            return Ok(PhoneCheckOutcome::Registered { user_id: user.id });
        }

        let dispatch = self.otp_service.send_otp_code(phone).await?;
        Ok(PhoneCheckOutcome::NotRegistered { dispatch })
    }

    /// Log in with phone number and password
    pub async fn login(&self, phone: &str, password: &str, ip: Option<&str>) -> DomainResult<LoginOutcome> {
        let phone = validate_phone(phone)?;
        let identity = Identity::new(Some(phone), ip);

        if let Some(remaining_minutes) = self.blocked_minutes(&identity).await? {
            return Ok(LoginOutcome::Blocked {
                remaining_minutes,
                message: BLOCKED_MESSAGE.to_string(),
            });
        }

        match self.verifier.verify(phone, password).await? {
            Some(user) => {
                self.block_service.reset_attempts(&identity).await?;
                tracing::info!(
                    phone = %mask_phone_number(phone),
                    user_id = %user.id,
                    event = "login_succeeded",
                    "User logged in"
                );
                Ok(LoginOutcome::Authenticated { user_id: user.id })
            }
            None => {
                let remaining_attempts = self.record_failure(&identity).await?;
                Ok(LoginOutcome::InvalidCredentials {
                    remaining_attempts,
                    message: failure_message(remaining_attempts, self.block_service.policy()),
                })
            }
        }
    }

    /// Prove ownership of `phone` with the code sent during the phone check
    pub async fn register(&self, phone: &str, code: &str, ip: Option<&str>) -> DomainResult<RegisterOutcome> {
        let phone = validate_phone(phone)?;
        if !is_code_format(code) {
            return Err(DomainError::Validation {
                message: CODE_FORMAT_MESSAGE.to_string(),
            });
        }
        let identity = Identity::new(Some(phone), ip);

        if let Some(remaining_minutes) = self.blocked_minutes(&identity).await? {
            return Ok(RegisterOutcome::Blocked {
                remaining_minutes,
                message: BLOCKED_MESSAGE.to_string(),
            });
        }

        if !self.otp_service.validate_code(phone, code).await {
            let remaining_attempts = self.record_failure(&identity).await?;
            return Ok(RegisterOutcome::InvalidCode {
                remaining_attempts,
                message: failure_message(remaining_attempts, self.block_service.policy()),
            });
        }

        self.block_service.reset_attempts(&identity).await?;
        tracing::info!(
            phone = %mask_phone_number(phone),
            event = "phone_verified",
            "Phone number verified for registration"
        );

        Ok(RegisterOutcome::Verified {
            phone: phone.to_string(),
        })
    }

    /// Minutes left on the block, `None` when not blocked
    async fn blocked_minutes(&self, identity: &Identity) -> DomainResult<Option<u64>> {
        let status = self.block_service.get_block_status(identity).await?;
        Ok(status.is_blocked.then(|| status.remaining_minutes()))
    }

    /// Count a failure and return the attempts left
    async fn record_failure(&self, identity: &Identity) -> DomainResult<u32> {
        let attempts = self.block_service.increment_attempts(identity).await?;
        Ok(self.block_service.remaining_after(attempts))
    }
}

fn validate_phone(phone: &str) -> DomainResult<&str> {
    let phone = phone.trim();
    if !is_valid_mobile(phone) {
        return Err(DomainError::Validation {
            message: PHONE_FORMAT_MESSAGE.to_string(),
        });
    }
    Ok(phone)
}
