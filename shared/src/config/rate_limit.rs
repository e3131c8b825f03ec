//! Rate limiting configuration module
//!
//! Covers the failed-attempt block policy and the per-request throttle.

use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Failed attempt tracking and lockout
    #[serde(default)]
    pub block: BlockPolicyConfig,

    /// Throttle for phone status checks
    #[serde(default)]
    pub phone_check: ThrottleConfig,
}

/// Failed attempt policy for phone numbers and IP addresses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockPolicyConfig {
    /// Number of failed attempts before blocking
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// How long a block lasts, in seconds
    #[serde(default = "default_block_duration")]
    pub block_duration_seconds: u64,

    /// TTL of the failed attempt counter, refreshed on every failure
    #[serde(default = "default_counter_ttl")]
    pub attempt_counter_ttl_seconds: u64,
}

impl Default for BlockPolicyConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            block_duration_seconds: default_block_duration(),
            attempt_counter_ttl_seconds: default_counter_ttl(),
        }
    }
}

impl BlockPolicyConfig {
    /// Block duration rounded down to whole minutes
    pub fn block_duration_minutes(&self) -> u64 {
        self.block_duration_seconds / 60
    }
}

/// Fixed request budget per window
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Enable the throttle
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Requests allowed per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds
    #[serde(default = "default_window")]
    pub window_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window(),
        }
    }
}

impl RateLimitConfig {
    /// Create a development configuration (more lenient throttle)
    pub fn development() -> Self {
        Self {
            block: BlockPolicyConfig::default(),
            phone_check: ThrottleConfig {
                max_requests: 30,
                ..Default::default()
            },
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_threshold() -> u32 {
    3
}

fn default_block_duration() -> u64 {
    3600  // 1 hour
}

fn default_counter_ttl() -> u64 {
    3600  // 1 hour
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    5
}

fn default_window() -> u64 {
    60
}
