//! Outcomes of the authentication flow

use serde::Serialize;

use crate::services::otp::OtpDispatch;

/// Result of checking a phone number before login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhoneCheckOutcome {
    /// Too many checks from this client
    Throttled { retry_after: u64 },
    Blocked { remaining_minutes: u64, message: String },
    /// Known user, continue with password login
    Registered { user_id: String },
    /// Unknown phone, a verification code was sent
    NotRegistered { dispatch: OtpDispatch },
}

/// Result of a password login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    Blocked { remaining_minutes: u64, message: String },
    InvalidCredentials { remaining_attempts: u32, message: String },
    Authenticated { user_id: String },
}

/// Result of submitting a registration code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegisterOutcome {
    Blocked { remaining_minutes: u64, message: String },
    InvalidCode { remaining_attempts: u32, message: String },
    /// Phone ownership proven, the caller may create the account
    Verified { phone: String },
}
