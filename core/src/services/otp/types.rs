//! Types for OTP service results

use serde::Serialize;

/// Result of sending a verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpDispatch {
    /// Always "success" once the code is stored and queued
    pub status: String,
    pub message: String,
    /// Seconds the client should wait before asking again
    pub retry_after: u64,
}
