//! Collaborators the flow depends on

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::DomainResult;

/// Reference to a stored user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: String,
}

/// Lookup of registered users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the user registered with `phone`
    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<UserRef>>;
}

/// Password check for phone-based accounts
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// The user owning `phone` if `password` matches, `None` otherwise
    async fn verify(&self, phone: &str, password: &str) -> DomainResult<Option<UserRef>>;
}
