//! Redis-backed cache store

use std::time::Duration;

use async_trait::async_trait;

use qs_core::cache::{CacheError, CacheResult, CacheStore};

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// [`CacheStore`] over a shared Redis instance
///
/// Keys are written as-is unless the client's configuration sets a prefix.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: RedisClient,
}

impl RedisCacheStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

fn unavailable(error: InfrastructureError) -> CacheError {
    CacheError::Unavailable {
        message: error.to_string(),
    }
}

/// Redis expiries are whole seconds; round up so nothing expires early
fn whole_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.client.get(&self.key(key)).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.client
            .set_with_expiry(&self.key(key), value, whole_seconds(ttl))
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.client.delete(&self.key(key)).await.map_err(unavailable)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        self.client
            .increment_with_expiry(&self.key(key), whole_seconds(ttl))
            .await
            .map_err(unavailable)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<u64>> {
        let ttl = self.client.ttl(&self.key(key)).await.map_err(unavailable)?;
        Ok(ttl.map(|seconds| seconds.max(0) as u64))
    }

    async fn try_acquire_lock(&self, name: &str, token: &str, lease: Duration) -> CacheResult<bool> {
        let lease_ms = (lease.as_millis() as u64).max(1);
        self.client
            .set_if_absent(&self.key(name), token, lease_ms)
            .await
            .map_err(unavailable)
    }

    async fn release_lock(&self, name: &str, token: &str) -> CacheResult<bool> {
        self.client
            .delete_if_equals(&self.key(name), token)
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds_rounds_up() {
        assert_eq!(whole_seconds(Duration::from_secs(120)), 120);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(whole_seconds(Duration::from_millis(10)), 1);
        assert_eq!(whole_seconds(Duration::ZERO), 1);
    }
}
