//! Distributed mutual exclusion on top of [`CacheStore`]
//!
//! A lock is a cache key holding a random token, written only if absent and
//! expiring after its lease. Only the holder of the token can release it, so
//! a holder whose lease already ran out cannot free somebody else's lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CacheError, CacheResult, CacheStore};

/// Delay between acquisition attempts while the lock is held elsewhere
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Acquire the lock `name`, waiting up to `wait` for the current holder
///
/// # Arguments
///
/// * `store` - Cache store holding the lock key
/// * `name` - Lock key
/// * `lease` - How long the lock survives if never released
/// * `wait` - How long to keep retrying before giving up
///
/// # Returns
///
/// * `Ok(LockGuard)` - The lock is held until the guard is released or dropped
/// * `Err(CacheError::LockTimeout)` - Still held elsewhere after `wait`
/// * `Err(CacheError)` - The store failed
pub async fn acquire<C>(
    store: Arc<C>,
    name: &str,
    lease: Duration,
    wait: Duration,
) -> CacheResult<LockGuard<C>>
where
    C: CacheStore + ?Sized + 'static,
{
    let token = Uuid::new_v4().to_string();
    let deadline = Instant::now() + wait;

    loop {
        if store.try_acquire_lock(name, &token, lease).await? {
            debug!(lock = name, "Lock acquired");
            return Ok(LockGuard {
                store,
                name: name.to_string(),
                token,
                released: false,
            });
        }

        if Instant::now() >= deadline {
            warn!(lock = name, wait_ms = wait.as_millis() as u64, "Gave up waiting for lock");
            return Err(CacheError::LockTimeout {
                name: name.to_string(),
            });
        }

        sleep(LOCK_POLL_INTERVAL).await;
    }
}

/// A held lock
///
/// Call [`LockGuard::release`] on the normal path. A guard dropped without
/// release (early return, panic, cancelled future) schedules the release on
/// the current Tokio runtime; without a runtime the lease expiry frees it.
pub struct LockGuard<C>
where
    C: CacheStore + ?Sized + 'static,
{
    store: Arc<C>,
    name: String,
    token: String,
    released: bool,
}

impl<C> LockGuard<C>
where
    C: CacheStore + ?Sized + 'static,
{
    /// Name of the held lock
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the lock
    ///
    /// Returns `false` when the lease had already expired and the lock was
    /// gone or taken by someone else.
    pub async fn release(mut self) -> CacheResult<bool> {
        self.released = true;
        let released = self.store.release_lock(&self.name, &self.token).await?;
        if !released {
            warn!(lock = %self.name, "Lock lease expired before release");
        }
        Ok(released)
    }
}

impl<C> Drop for LockGuard<C>
where
    C: CacheStore + ?Sized + 'static,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = Arc::clone(&self.store);
        let name = std::mem::take(&mut self.name);
        let token = std::mem::take(&mut self.token);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = store.release_lock(&name, &token).await {
                        warn!(lock = %name, error = %e, "Failed to release dropped lock");
                    }
                });
            }
            Err(_) => {
                warn!(lock = %name, "No runtime to release dropped lock, waiting for lease expiry");
            }
        }
    }
}
