//! One-time passcode and SMS delivery configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OTP issuing and validation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Lifetime of a stored code in seconds
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,

    /// Lease of the per-phone validation lock in seconds
    #[serde(default = "default_lock_lease")]
    pub lock_lease_seconds: u64,

    /// How long a validation waits to obtain the lock, in milliseconds
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,

    /// Client-side retry hint returned after sending a code
    #[serde(default = "default_retry_after")]
    pub retry_after_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl(),
            lock_lease_seconds: default_lock_lease(),
            lock_wait_ms: default_lock_wait(),
            retry_after_seconds: default_retry_after(),
        }
    }
}

impl OtpConfig {
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    /// Code lifetime in whole minutes, at least one
    pub fn code_ttl_minutes(&self) -> u64 {
        (self.code_ttl_seconds / 60).max(1)
    }

    pub fn lock_lease(&self) -> Duration {
        Duration::from_secs(self.lock_lease_seconds)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}

/// SMS provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// SMS service provider ("mock")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Send attempts per queued message
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between send attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("SMS_PROVIDER").unwrap_or_else(|_| default_provider()),
            ..Default::default()
        }
    }
}

fn default_code_ttl() -> u64 {
    120
}

fn default_lock_lease() -> u64 {
    5
}

fn default_lock_wait() -> u64 {
    5000
}

fn default_retry_after() -> u64 {
    60
}

fn default_provider() -> String {
    String::from("mock")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}
