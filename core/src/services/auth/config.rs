//! Authentication flow configuration

use qs_shared::config::{AppConfig, OtpConfig, RateLimitConfig};

/// Configuration for [`super::AuthFlow`]
#[derive(Debug, Clone, Default)]
pub struct AuthFlowConfig {
    /// Block policy and phone check throttle
    pub rate_limit: RateLimitConfig,
    /// Code lifetime and validation lock
    pub otp: OtpConfig,
}

impl From<&AppConfig> for AuthFlowConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            rate_limit: config.rate_limit.clone(),
            otp: config.otp.clone(),
        }
    }
}
