//! Shared cache store contract
//!
//! Every piece of authentication state (block flags, attempt counters, OTP
//! codes, validation locks) lives in a cache store shared by all workers.
//! Implementations live in the infrastructure crate (Redis, in-memory).

pub mod keys;
pub mod lock;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use lock::LockGuard;

/// Errors raised by cache store implementations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {message}")]
    Unavailable { message: String },

    #[error("Timed out waiting for lock {name}")]
    LockTimeout { name: String },

    #[error("Corrupted value at {key}: {message}")]
    Corrupted { key: String, message: String },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with TTLs, atomic counters and leased locks
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, `None` if absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value with expiration, overwriting any previous value
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Atomically increment a counter, creating it at 1 when absent
    ///
    /// The TTL is reset to `ttl` on every call.
    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64>;

    /// Remaining time-to-live in seconds, `None` if absent or without expiry
    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<u64>>;

    /// Take the lock `name` for `token` if nobody holds it
    ///
    /// The lock expires on its own after `lease`.
    async fn try_acquire_lock(&self, name: &str, token: &str, lease: Duration) -> CacheResult<bool>;

    /// Release the lock `name` if it is still held by `token`
    async fn release_lock(&self, name: &str, token: &str) -> CacheResult<bool>;
}
