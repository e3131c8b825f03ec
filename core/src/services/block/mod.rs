//! Failed attempt tracking and temporary blocking
//!
//! Block flags and attempt counters are kept per phone number and per IP
//! address in the shared cache store, so every worker sees the same state.

mod identity;
mod service;

#[cfg(test)]
mod tests;

pub use identity::{BlockStatus, Identity};
pub use service::BlockService;
