//! Per-client request throttle
//!
//! Counts requests per scope and client in the shared cache store. The
//! window restarts from the latest allowed request. Denied requests are not
//! recorded, so a throttled client gets through once the window runs out.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use qs_shared::config::ThrottleConfig;

use crate::cache::{keys, CacheError, CacheStore};
use crate::errors::{DomainError, DomainResult};

/// Throttle verdict for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThrottleStatus {
    /// Request allowed, `remaining` more fit in the current window
    Allowed { remaining: u32 },
    /// Too many requests, retry after `retry_after` seconds
    Throttled { retry_after: u64 },
}

impl ThrottleStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleStatus::Allowed { .. })
    }
}

/// Request counter keyed by scope, client IP and phone number
pub struct RequestThrottle<C>
where
    C: CacheStore + ?Sized,
{
    cache: Arc<C>,
    config: ThrottleConfig,
}

impl<C> RequestThrottle<C>
where
    C: CacheStore + ?Sized,
{
    pub fn new(cache: Arc<C>, config: ThrottleConfig) -> Self {
        Self { cache, config }
    }

    /// Count a request and decide whether it may proceed
    pub async fn check(
        &self,
        scope: &str,
        ip: Option<&str>,
        phone: Option<&str>,
    ) -> DomainResult<ThrottleStatus> {
        if !self.config.enabled {
            return Ok(ThrottleStatus::Allowed {
                remaining: self.config.max_requests,
            });
        }

        let ident = format!("{}_{}", ip.unwrap_or_default(), phone.unwrap_or_default());
        let key = keys::throttle(scope, &ident);
        let max = i64::from(self.config.max_requests);

        let recorded = self.recorded_requests(&key).await?;
        let count = if recorded >= max {
            recorded + 1
        } else {
            self.cache
                .increment(&key, Duration::from_secs(self.config.window_seconds))
                .await?
        };

        if count > max {
            tracing::warn!(
                scope = scope,
                ip = ?ip,
                count = count,
                limit = self.config.max_requests,
                event = "request_throttled",
                "Request throttled"
            );
            return Ok(ThrottleStatus::Throttled {
                retry_after: self.config.window_seconds,
            });
        }

        Ok(ThrottleStatus::Allowed {
            remaining: (max - count) as u32,
        })
    }

    async fn recorded_requests(&self, key: &str) -> DomainResult<i64> {
        match self.cache.get(key).await? {
            Some(value) => value.parse::<i64>().map_err(|e| {
                DomainError::from(CacheError::Corrupted {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::mock::MockCacheStore;

    const SCOPE: &str = "phone_check";
    const IP: Option<&str> = Some("10.0.0.1");
    const PHONE: Option<&str> = Some("+989123456789");

    fn throttle(config: ThrottleConfig) -> (RequestThrottle<MockCacheStore>, Arc<MockCacheStore>) {
        let cache = Arc::new(MockCacheStore::new());
        (RequestThrottle::new(cache.clone(), config), cache)
    }

    #[tokio::test]
    async fn test_sixth_request_is_throttled() {
        let (throttle, _) = throttle(ThrottleConfig::default());

        for expected in (0..5).rev() {
            let status = throttle.check(SCOPE, IP, PHONE).await.unwrap();
            assert_eq!(status, ThrottleStatus::Allowed { remaining: expected });
        }

        let status = throttle.check(SCOPE, IP, PHONE).await.unwrap();
        assert_eq!(status, ThrottleStatus::Throttled { retry_after: 60 });
        assert!(!status.is_allowed());
    }

    #[tokio::test]
    async fn test_key_combines_ip_and_phone() {
        let (throttle, cache) = throttle(ThrottleConfig::default());

        throttle.check(SCOPE, IP, PHONE).await.unwrap();

        assert_eq!(
            cache.peek("throttle_phone_check_10.0.0.1_+989123456789").as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_clients_are_counted_separately() {
        let (throttle, _) = throttle(ThrottleConfig {
            max_requests: 1,
            ..ThrottleConfig::default()
        });

        assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        assert!(!throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        assert!(throttle.check(SCOPE, Some("10.0.0.2"), PHONE).await.unwrap().is_allowed());
        assert!(throttle.check(SCOPE, IP, Some("+989111111111")).await.unwrap().is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_restarts_after_quiet_period() {
        let (throttle, _) = throttle(ThrottleConfig {
            max_requests: 1,
            ..ThrottleConfig::default()
        });

        assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_requests_do_not_extend_window() {
        let (throttle, cache) = throttle(ThrottleConfig {
            max_requests: 1,
            ..ThrottleConfig::default()
        });

        assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(19)).await;
            assert!(!throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        }
        assert_eq!(
            cache.peek("throttle_phone_check_10.0.0.1_+989123456789").as_deref(),
            Some("1")
        );

        // 61 s after the only allowed request
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let (throttle, cache) = throttle(ThrottleConfig::default());
        cache.set_should_fail(true);

        assert!(matches!(
            throttle.check(SCOPE, IP, PHONE).await,
            Err(DomainError::BackendUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_throttle_always_allows() {
        let (throttle, cache) = throttle(ThrottleConfig {
            enabled: false,
            max_requests: 1,
            ..ThrottleConfig::default()
        });

        for _ in 0..10 {
            assert!(throttle.check(SCOPE, IP, PHONE).await.unwrap().is_allowed());
        }
        assert!(cache.peek("throttle_phone_check_10.0.0.1_+989123456789").is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(ThrottleStatus::Throttled { retry_after: 60 }).unwrap();
        assert_eq!(json["status"], "throttled");
        assert_eq!(json["retry_after"], 60);
    }
}
