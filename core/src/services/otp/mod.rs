//! One-time passcode issuing and validation

mod delivery;
mod service;
mod types;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests;

pub use delivery::CodeDelivery;
pub use service::{OtpService, CODE_LENGTH};
pub(crate) use service::is_code_format;
pub use types::OtpDispatch;
