//! # QuickSign Core
//!
//! Domain layer for the QuickSign authentication backend.
//! This crate contains the cache store and delivery contracts, the block
//! and OTP services, and the login/registration flow built on top of them.
//! All state lives in the injected cache store; nothing here keeps mutable
//! state in process memory.

pub mod cache;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use cache::{CacheError, CacheResult, CacheStore};
pub use errors::{DomainError, DomainResult};
pub use services::*;
