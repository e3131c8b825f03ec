//! Business services containing domain logic and use cases.

pub mod auth;
pub mod block;
pub mod otp;
pub mod throttle;

// Re-export commonly used types
pub use auth::{
    AuthFlow, AuthFlowConfig, CredentialVerifier, LoginOutcome, PhoneCheckOutcome,
    RegisterOutcome, UserDirectory, UserRef,
};
pub use block::{BlockService, BlockStatus, Identity};
pub use otp::{CodeDelivery, OtpDispatch, OtpService};
pub use throttle::{RequestThrottle, ThrottleStatus};
