//! Cache store implementations
//!
//! Redis for deployments with several workers, in-memory for development
//! and tests.

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

pub use memory_store::MemoryCacheStore;
pub use redis_client::RedisClient;
pub use redis_store::RedisCacheStore;

// Re-export commonly used types
pub use qs_shared::config::CacheConfig;
