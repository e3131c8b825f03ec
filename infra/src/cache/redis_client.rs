//! Redis cache client implementation
//!
//! Wraps a multiplexed connection with retry logic and the handful of
//! commands the cache store needs: plain values with expiry, counters,
//! TTL lookups and token-guarded locks.

use once_cell::sync::Lazy;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use qs_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

// Delete the lock only while it still holds the caller's token
static RELEASE_LOCK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        if redis.call("GET", KEYS[1]) == ARGV[1] then
            return redis.call("DEL", KEYS[1])
        else
            return 0
        end
        "#,
    )
});

/// Redis cache client with a shared connection and retry logic
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Retries the initial connection `config.max_retries` times with
    /// exponential backoff starting at `config.retry_delay_ms`.
    ///
    /// # Example
    /// ```no_run
    /// use qs_infra::cache::RedisClient;
    /// use qs_shared::config::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, qs_infra::InfrastructureError> {
    ///     RedisClient::new(CacheConfig::new("redis://localhost:6379")).await
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value with expiration time in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            let expiry = expiry_seconds;

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Delete a key, true if it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.del::<_, u32>(key).await })
        })
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| {
            error!("Failed to delete key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Increment a counter and reset its expiry in one transaction
    pub async fn increment_with_expiry(
        &self,
        key: &str,
        expiry_seconds: u64,
    ) -> Result<i64, InfrastructureError> {
        debug!("Incrementing counter '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let expiry = expiry_seconds as i64;

                Box::pin(async move {
                    let (count,): (i64,) = redis::pipe()
                        .atomic()
                        .incr(&key, 1)
                        .expire(&key, expiry)
                        .ignore()
                        .query_async(&mut conn)
                        .await?;
                    Ok(count)
                })
            })
            .await;

        match result {
            Ok(count) => {
                debug!("Counter '{}' incremented to {}", key, count);
                Ok(count)
            }
            Err(e) => {
                error!("Failed to increment counter '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get time-to-live for a key
    ///
    /// `None` if the key doesn't exist or has no expiry.
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        debug!("Getting TTL for key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL for key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// `SET key value NX PX ttl`, true if the key was written
    pub async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_ms: u64,
    ) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();
                let ttl = ttl_ms;

                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("PX")
                        .arg(ttl)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(reply) => Ok(reply.is_some()),
            Err(e) => {
                error!("Failed to set key '{}' if absent: {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete `key` only if it still holds `value`
    pub async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move {
                    RELEASE_LOCK_SCRIPT
                        .key(key)
                        .arg(value)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(deleted) => Ok(deleted > 0),
            Err(e) => {
                error!("Failed to delete key '{}' by value: {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
