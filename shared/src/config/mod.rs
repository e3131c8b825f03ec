//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Shared cache store (Redis or in-memory)
//! - `environment` - Environment detection and logging configuration
//! - `otp` - One-time passcode lifetime, validation lock and SMS delivery
//! - `rate_limit` - Failed attempt blocking and request throttling

pub mod cache;
pub mod environment;
pub mod otp;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

pub use cache::{CacheConfig, CacheType};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::{OtpConfig, SmsConfig};
pub use rate_limit::{BlockPolicyConfig, RateLimitConfig, ThrottleConfig};

/// Prefix for environment variable overrides, e.g. `QUICKSIGN__OTP__CODE_TTL_SECONDS`
pub const ENV_PREFIX: &str = "QUICKSIGN";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Cache store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Blocking and throttling configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// OTP configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// SMS delivery configuration
    #[serde(default)]
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Create the built-in configuration for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let rate_limit = if environment.is_production() {
            RateLimitConfig::production()
        } else {
            RateLimitConfig::development()
        };

        Self {
            environment,
            cache: CacheConfig::default(),
            rate_limit,
            otp: OtpConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            cache: CacheConfig::from_env(),
            sms: SmsConfig::from_env(),
            ..Self::for_environment(environment)
        }
    }

    /// Load layered configuration
    ///
    /// Layers, later ones winning: built-in defaults and plain env vars
    /// (`REDIS_URL`, `SMS_PROVIDER`), the optional `config.{env}.toml` file,
    /// then `QUICKSIGN__`-prefixed variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let base = Self::from_env();
        let file = base.environment.config_file().to_string();

        config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
