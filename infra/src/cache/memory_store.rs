//! Process-local cache store
//!
//! Only suitable for a single worker: state is not shared across processes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use qs_core::cache::{CacheError, CacheResult, CacheStore};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory [`CacheStore`] with lazy expiry
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        Ok(live(&mut entries, key, Instant::now()).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut entries = self.entries.lock().await;
        let existed = live(&mut entries, key, Instant::now()).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let current = match live(&mut entries, key, now) {
            Some(entry) => entry.value.parse::<i64>().map_err(|e| CacheError::Corrupted {
                key: key.to_string(),
                message: e.to_string(),
            })?,
            None => 0,
        };

        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(next)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<u64>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        Ok(live(&mut entries, key, now)
            .map(|entry| entry.expires_at.saturating_duration_since(now).as_secs()))
    }

    async fn try_acquire_lock(&self, name: &str, token: &str, lease: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if live(&mut entries, name, now).is_some() {
            return Ok(false);
        }

        entries.insert(
            name.to_string(),
            Entry {
                value: token.to_string(),
                expires_at: now + lease,
            },
        );
        Ok(true)
    }

    async fn release_lock(&self, name: &str, token: &str) -> CacheResult<bool> {
        let mut entries = self.entries.lock().await;

        let held = live(&mut entries, name, Instant::now()).is_some_and(|entry| entry.value == token);
        if held {
            entries.remove(name);
        }
        Ok(held)
    }
}
