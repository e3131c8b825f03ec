//! Shared configuration and utilities for the QuickSign server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (cache, block policy, OTP, throttling, SMS, logging)
//! - Phone number utilities

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, BlockPolicyConfig, CacheConfig, CacheType, Environment, LogFormat,
    LoggingConfig, OtpConfig, RateLimitConfig, SmsConfig, ThrottleConfig,
};
pub use utils::phone;
