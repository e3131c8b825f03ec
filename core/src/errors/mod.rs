//! Domain-specific error types and error handling.

use thiserror::Error;

use crate::cache::CacheError;


/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// A caller passed arguments that can never be valid (e.g. no identity at all)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// User supplied input failed validation
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The cache store or lock primitive could not be reached
    #[error("Backend unavailable: {message}")]
    BackendUnavailable { message: String },

    /// A verification code could not be handed to the delivery channel
    #[error("Delivery failure: {message}")]
    DeliveryFailure { message: String },
}

impl DomainError {
    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            DomainError::DeliveryFailure { .. } => "DELIVERY_FAILURE",
        }
    }
}

impl From<CacheError> for DomainError {
    fn from(error: CacheError) -> Self {
        DomainError::BackendUnavailable {
            message: error.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
