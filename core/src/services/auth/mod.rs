//! Phone check, login and registration flow
//!
//! Ties the throttle, block tracking and OTP services together. User storage
//! and password checking are reached only through [`UserDirectory`] and
//! [`CredentialVerifier`].

mod config;
mod flow;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthFlowConfig;
pub use flow::{failure_message, AuthFlow, BLOCKED_MESSAGE, CODE_FORMAT_MESSAGE, PHONE_CHECK_SCOPE};
pub use traits::{CredentialVerifier, UserDirectory, UserRef};
pub use types::{LoginOutcome, PhoneCheckOutcome, RegisterOutcome};
