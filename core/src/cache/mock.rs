//! Mock cache store for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use super::{CacheError, CacheResult, CacheStore};

/// In-memory cache store with TTLs driven by Tokio's clock
///
/// Works with `tokio::time::pause`/`advance`, can simulate an outage, and can
/// stall every read to widen race windows.
pub struct MockCacheStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
    should_fail: AtomicBool,
    read_delay: Option<Duration>,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            should_fail: AtomicBool::new(false),
            read_delay: None,
        }
    }

    /// Stall every `get` for `delay` after reading the value
    pub fn with_read_delay(delay: Duration) -> Self {
        Self {
            read_delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Raw read for assertions, ignoring the failure switch
    pub fn peek(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        Self::live_value(&mut entries, key)
    }

    fn check(&self) -> CacheResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable {
                message: "Cache service error".to_string(),
            });
        }
        Ok(())
    }

    fn live_value(
        entries: &mut HashMap<String, (String, Option<Instant>)>,
        key: &str,
    ) -> Option<String> {
        match entries.get(key) {
            Some((_, Some(expires_at))) if *expires_at <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }
}

impl Default for MockCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        let value = {
            let mut entries = self.entries.lock().unwrap();
            Self::live_value(&mut entries, key)
        };
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Some(Instant::now() + ttl)));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let existed = Self::live_value(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let current = match Self::live_value(&mut entries, key) {
            Some(value) => value.parse::<i64>().map_err(|e| CacheError::Corrupted {
                key: key.to_string(),
                message: e.to_string(),
            })?,
            None => 0,
        };
        let next = current + 1;
        entries.insert(key.to_string(), (next.to_string(), Some(Instant::now() + ttl)));
        Ok(next)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<u64>> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        if Self::live_value(&mut entries, key).is_none() {
            return Ok(None);
        }
        Ok(entries
            .get(key)
            .and_then(|(_, expires_at)| *expires_at)
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()).as_secs()))
    }

    async fn try_acquire_lock(&self, name: &str, token: &str, lease: Duration) -> CacheResult<bool> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        if Self::live_value(&mut entries, name).is_some() {
            return Ok(false);
        }
        entries.insert(name.to_string(), (token.to_string(), Some(Instant::now() + lease)));
        Ok(true)
    }

    async fn release_lock(&self, name: &str, token: &str) -> CacheResult<bool> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        match Self::live_value(&mut entries, name) {
            Some(holder) if holder == token => {
                entries.remove(name);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
