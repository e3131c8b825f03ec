//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Shared cache store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Backing store (redis or memory)
    #[serde(default = "default_cache_type")]
    pub cache_type: CacheType,

    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Maximum attempts for a single Redis operation
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubles on each retry)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Optional prefix prepended to every key
    ///
    /// Leave unset when sharing the key namespace with existing deployments.
    #[serde(default)]
    pub key_prefix: Option<String>,
}

/// Cache type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    Redis,
    /// Process-local store, for development and tests only
    Memory,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            url: default_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| default_url());
        let cache_type = match std::env::var("CACHE_TYPE").as_deref() {
            Ok("memory") => CacheType::Memory,
            _ => CacheType::Redis,
        };

        Self {
            cache_type,
            url,
            ..Default::default()
        }
    }

    /// Create a new Redis cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create an in-memory cache configuration
    pub fn memory() -> Self {
        Self {
            cache_type: CacheType::Memory,
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_cache_type() -> CacheType {
    CacheType::Redis
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.cache_type, CacheType::Redis);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_cache_config_with_prefix() {
        let config = CacheConfig::new("redis://cache:6379").with_prefix("quicksign");
        assert_eq!(config.make_key("phone_blocked_+989123456789"), "quicksign:phone_blocked_+989123456789");
    }

    #[test]
    fn test_cache_key_without_prefix() {
        let config = CacheConfig::memory();
        assert_eq!(config.cache_type, CacheType::Memory);
        assert_eq!(config.make_key("otp_lock_+989123456789"), "otp_lock_+989123456789");
    }
}
