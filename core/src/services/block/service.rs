//! Block service implementation

use std::sync::Arc;
use std::time::Duration;

use qs_shared::config::BlockPolicyConfig;

use crate::cache::{keys, CacheError, CacheStore};
use crate::errors::{DomainError, DomainResult};

use super::identity::{BlockStatus, Identity};

/// Value written to block flags
const BLOCKED_FLAG: &str = "true";

/// Tracks failed attempts and blocks identities that exceed the threshold
///
/// Every failure of the cache store is returned as
/// `DomainError::BackendUnavailable`; an unreachable store is never reported
/// as "not blocked".
pub struct BlockService<C>
where
    C: CacheStore + ?Sized,
{
    cache: Arc<C>,
    policy: BlockPolicyConfig,
}

impl<C> BlockService<C>
where
    C: CacheStore + ?Sized,
{
    /// Create a new block service
    ///
    /// # Arguments
    ///
    /// * `cache` - Shared cache store holding flags and counters
    /// * `policy` - Threshold and durations
    pub fn new(cache: Arc<C>, policy: BlockPolicyConfig) -> Self {
        Self { cache, policy }
    }

    pub fn policy(&self) -> &BlockPolicyConfig {
        &self.policy
    }

    /// Attempts left before a block once `attempts` failures are recorded
    pub fn remaining_after(&self, attempts: u32) -> u32 {
        self.policy.threshold.saturating_sub(attempts)
    }

    /// Check whether the phone or the IP of an identity is blocked
    pub async fn is_blocked(&self, identity: &Identity) -> DomainResult<bool> {
        identity.ensure_present()?;

        for key in flag_keys(identity) {
            if self.cache.get(&key).await?.is_some() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Block every present part of an identity for the block duration
    ///
    /// The attempt counter is pinned to the threshold for the same duration.
    pub async fn block_user(&self, identity: &Identity) -> DomainResult<()> {
        identity.ensure_present()?;
        let duration = Duration::from_secs(self.policy.block_duration_seconds);

        for key in flag_keys(identity) {
            self.cache.set(&key, BLOCKED_FLAG, duration).await?;
        }

        if let Some(subject) = identity.counter_subject() {
            self.cache
                .set(
                    &keys::failed_attempts(subject),
                    &self.policy.threshold.to_string(),
                    duration,
                )
                .await?;
        }

        tracing::warn!(
            phone = ?identity.masked_phone(),
            ip = ?identity.ip_address(),
            duration_seconds = self.policy.block_duration_seconds,
            event = "identity_blocked",
            "Identity blocked after too many failed attempts"
        );

        Ok(())
    }

    /// Lift a block and forget the failed attempts
    pub async fn unblock_user(&self, identity: &Identity) -> DomainResult<()> {
        identity.ensure_present()?;

        for key in flag_keys(identity) {
            self.cache.delete(&key).await?;
        }
        if let Some(subject) = identity.counter_subject() {
            self.cache.delete(&keys::failed_attempts(subject)).await?;
        }

        tracing::info!(
            phone = ?identity.masked_phone(),
            ip = ?identity.ip_address(),
            event = "identity_unblocked",
            "Identity unblocked"
        );

        Ok(())
    }

    /// Record a failed attempt and block the identity once it reaches the threshold
    ///
    /// The counter's TTL slides forward on every failure.
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - The number of failed attempts including this one
    pub async fn increment_attempts(&self, identity: &Identity) -> DomainResult<u32> {
        identity.ensure_present()?;
        let subject = identity.counter_subject().unwrap_or_default();

        let count = self
            .cache
            .increment(
                &keys::failed_attempts(subject),
                Duration::from_secs(self.policy.attempt_counter_ttl_seconds),
            )
            .await?;
        let attempts = count.clamp(0, i64::from(u32::MAX)) as u32;

        tracing::warn!(
            phone = ?identity.masked_phone(),
            ip = ?identity.ip_address(),
            attempts = attempts,
            threshold = self.policy.threshold,
            event = "failed_attempt",
            "Failed attempt recorded"
        );

        if attempts >= self.policy.threshold {
            self.block_user(identity).await?;
        }

        Ok(attempts)
    }

    /// Forget the failed attempts of an identity
    ///
    /// Block flags are left in place.
    pub async fn reset_attempts(&self, identity: &Identity) -> DomainResult<()> {
        identity.ensure_present()?;
        let subject = identity.counter_subject().unwrap_or_default();

        self.cache.delete(&keys::failed_attempts(subject)).await?;

        tracing::info!(
            phone = ?identity.masked_phone(),
            ip = ?identity.ip_address(),
            event = "attempts_reset",
            "Failed attempts reset"
        );

        Ok(())
    }

    /// Current block state of an identity
    pub async fn get_block_status(&self, identity: &Identity) -> DomainResult<BlockStatus> {
        let is_blocked = self.is_blocked(identity).await?;
        let attempts = self.attempts(identity).await?;

        let mut block_time_left = 0;
        if is_blocked {
            for key in flag_keys(identity) {
                if let Some(ttl) = self.cache.ttl_remaining(&key).await? {
                    block_time_left = block_time_left.max(ttl);
                }
            }
        }

        Ok(BlockStatus {
            is_blocked,
            remaining_attempts: self.remaining_after(attempts),
            block_time_left,
        })
    }

    async fn attempts(&self, identity: &Identity) -> DomainResult<u32> {
        let Some(subject) = identity.counter_subject() else {
            return Ok(0);
        };
        let key = keys::failed_attempts(subject);

        match self.cache.get(&key).await? {
            Some(value) => value.trim().parse::<u32>().map_err(|e| {
                DomainError::from(CacheError::Corrupted {
                    key,
                    message: e.to_string(),
                })
            }),
            None => Ok(0),
        }
    }
}

/// Block flag keys for the present parts of an identity
fn flag_keys(identity: &Identity) -> Vec<String> {
    identity
        .phone_number()
        .map(keys::phone_blocked)
        .into_iter()
        .chain(identity.ip_address().map(keys::ip_blocked))
        .collect()
}
