//! Delivery channel for verification codes

use crate::errors::DomainResult;

/// Hands a verification code to whatever delivers it to the user
///
/// Implementations must return without waiting for the delivery itself
/// (typically by pushing onto a queue drained by a background worker).
pub trait CodeDelivery: Send + Sync {
    /// Queue `code` for delivery to `phone`
    ///
    /// Returns `DomainError::DeliveryFailure` if the channel cannot accept it.
    fn enqueue_delivery(&self, phone: &str, code: &str) -> DomainResult<()>;
}
