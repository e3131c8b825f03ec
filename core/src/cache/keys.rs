//! Cache key layout
//!
//! These names are shared with existing deployments and must not change.

/// Block flag for a phone number
pub fn phone_blocked(phone: &str) -> String {
    format!("phone_blocked_{}", phone)
}

/// Block flag for an IP address
pub fn ip_blocked(ip: &str) -> String {
    format!("ip_blocked_{}", ip)
}

/// Failed attempt counter for an identity
pub fn failed_attempts(subject: &str) -> String {
    format!("failed_attempts_{}", subject)
}

/// Pending verification code for a phone number
pub fn verification_code(phone: &str) -> String {
    format!("verification_code_{}", phone)
}

/// Validation lock for a phone number
pub fn otp_lock(phone: &str) -> String {
    format!("otp_lock_{}", phone)
}

/// Request counter for a throttle scope
pub fn throttle(scope: &str, ident: &str) -> String {
    format!("throttle_{}_{}", scope, ident)
}
