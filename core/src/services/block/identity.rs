//! Types for block tracking

use serde::Serialize;

use qs_shared::utils::phone::mask_phone_number;

use crate::errors::{DomainError, DomainResult};

/// Who is making a request: a phone number, an IP address, or both
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    phone: Option<String>,
    ip: Option<String>,
}

impl Identity {
    pub fn new(phone: Option<&str>, ip: Option<&str>) -> Self {
        Self {
            phone: non_empty(phone),
            ip: non_empty(ip),
        }
    }

    /// Identity known only by phone number
    pub fn phone(phone: &str) -> Self {
        Self::new(Some(phone), None)
    }

    /// Identity known only by IP address
    pub fn ip(ip: &str) -> Self {
        Self::new(None, Some(ip))
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.ip.is_none()
    }

    /// Key part of the failed attempt counter: the phone if known, else the IP
    pub fn counter_subject(&self) -> Option<&str> {
        self.phone_number().or_else(|| self.ip_address())
    }

    /// Phone number safe for logs
    pub fn masked_phone(&self) -> Option<String> {
        self.phone.as_deref().map(mask_phone_number)
    }

    pub(crate) fn ensure_present(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::InvalidArgument {
                message: "A phone number or an IP address is required".to_string(),
            });
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Block state of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockStatus {
    pub is_blocked: bool,
    /// Failed attempts left before a block, never negative
    pub remaining_attempts: u32,
    /// Seconds until the block lifts, 0 when not blocked
    pub block_time_left: u64,
}

impl BlockStatus {
    /// Time until the block lifts, in whole minutes
    pub fn remaining_minutes(&self) -> u64 {
        self.block_time_left / 60
    }
}
