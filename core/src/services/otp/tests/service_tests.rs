//! Unit tests for OtpService

use std::sync::Arc;
use std::time::Duration;

use qs_shared::config::OtpConfig;

use crate::cache::mock::MockCacheStore;
use crate::cache::CacheStore;
use crate::services::otp::mock::MockCodeDelivery;
use crate::services::otp::{OtpService, CODE_LENGTH};

const PHONE: &str = "+989111111111";

type TestService = OtpService<MockCacheStore, MockCodeDelivery>;

fn create_service_with(cache: MockCacheStore) -> (TestService, Arc<MockCacheStore>, Arc<MockCodeDelivery>) {
    let cache = Arc::new(cache);
    let delivery = Arc::new(MockCodeDelivery::new());
    let service = OtpService::new(cache.clone(), delivery.clone(), OtpConfig::default());
    (service, cache, delivery)
}

fn create_service() -> (TestService, Arc<MockCacheStore>, Arc<MockCodeDelivery>) {
    create_service_with(MockCacheStore::new())
}

#[tokio::test]
async fn test_generate_code_stores_six_digits() {
    let (service, cache, _) = create_service();

    let code = service.generate_code(PHONE).await.unwrap();

    assert_eq!(code.len(), CODE_LENGTH);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_ne!(code.chars().next(), Some('0'));

    let stored = cache.get("verification_code_+989111111111").await.unwrap();
    assert_eq!(stored, Some(code));
}

#[tokio::test]
async fn test_new_code_replaces_previous() {
    let (service, cache, _) = create_service();

    service.generate_code(PHONE).await.unwrap();
    let second = service.generate_code(PHONE).await.unwrap();

    assert_eq!(cache.peek("verification_code_+989111111111"), Some(second));
}

#[tokio::test]
async fn test_send_otp_code_queues_delivery() {
    let (service, cache, delivery) = create_service();

    let dispatch = service.send_otp_code(PHONE).await.unwrap();

    assert_eq!(dispatch.status, "success");
    assert!(dispatch.message.contains(PHONE));
    assert_eq!(dispatch.retry_after, 60);

    let queued = delivery.last_code_for(PHONE).unwrap();
    assert_eq!(cache.peek("verification_code_+989111111111"), Some(queued));
}

#[tokio::test]
async fn test_send_succeeds_when_delivery_refuses() {
    let (service, cache, delivery) = create_service();
    delivery.close();

    let dispatch = service.send_otp_code(PHONE).await.unwrap();

    assert_eq!(dispatch.status, "success");
    assert!(delivery.sent().is_empty());
    assert!(cache.peek("verification_code_+989111111111").is_some());
}

#[tokio::test]
async fn test_code_is_accepted_exactly_once() {
    let (service, _, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    assert!(service.validate_code(PHONE, &code).await);
    assert!(!service.validate_code(PHONE, &code).await);
}

#[tokio::test]
async fn test_wrong_code_keeps_stored_code() {
    let (service, _, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };

    assert!(!service.validate_code(PHONE, wrong).await);
    assert!(service.validate_code(PHONE, &code).await);
}

#[tokio::test]
async fn test_code_for_other_phone_is_rejected() {
    let (service, _, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    assert!(!service.validate_code("+989122222222", &code).await);
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let (service, _, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    tokio::time::advance(Duration::from_secs(121)).await;

    assert!(!service.validate_code(PHONE, &code).await);
}

#[tokio::test(start_paused = true)]
async fn test_code_valid_just_before_expiry() {
    let (service, _, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    tokio::time::advance(Duration::from_secs(119)).await;

    assert!(service.validate_code(PHONE, &code).await);
}

#[tokio::test]
async fn test_malformed_codes_are_rejected() {
    let (service, _, _) = create_service();
    service.generate_code(PHONE).await.unwrap();

    assert!(!service.validate_code(PHONE, "").await);
    assert!(!service.validate_code(PHONE, "12345").await);
    assert!(!service.validate_code(PHONE, "1234567").await);
    assert!(!service.validate_code(PHONE, "12a456").await);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_validation_accepts_once() {
    // Stalled reads leave room for a second validator to slip in unlocked
    let (service, _, _) = create_service_with(MockCacheStore::with_read_delay(Duration::from_millis(50)));
    let code = service.generate_code(PHONE).await.unwrap();

    let (first, second) = tokio::join!(
        service.validate_code(PHONE, &code),
        service.validate_code(PHONE, &code),
    );

    assert!(first ^ second, "exactly one validation must succeed");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_validation_across_tasks() {
    let (service, _, _) = create_service_with(MockCacheStore::with_read_delay(Duration::from_millis(50)));
    let service = Arc::new(service);
    let code = service.generate_code(PHONE).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            let code = code.clone();
            tokio::spawn(async move { service.validate_code(PHONE, &code).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_holder_past_lease_does_not_reuse_code() {
    // Reads outlast the 5 s lease, so the second validator takes the lock
    // while the first still holds a copy of the code
    let (service, cache, _) = create_service_with(MockCacheStore::with_read_delay(Duration::from_secs(6)));
    let code = service.generate_code(PHONE).await.unwrap();

    let (first, second) = tokio::join!(
        service.validate_code(PHONE, &code),
        service.validate_code(PHONE, &code),
    );

    assert!(first ^ second, "exactly one validation must succeed");
    assert!(cache.peek("verification_code_+989111111111").is_none());
}

#[tokio::test]
async fn test_backend_failure_counts_as_mismatch() {
    let (service, cache, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    cache.set_should_fail(true);
    assert!(!service.validate_code(PHONE, &code).await);

    cache.set_should_fail(false);
    assert!(service.validate_code(PHONE, &code).await);
}

#[tokio::test(start_paused = true)]
async fn test_lock_timeout_counts_as_mismatch() {
    let (service, cache, _) = create_service();
    let code = service.generate_code(PHONE).await.unwrap();

    cache
        .try_acquire_lock("otp_lock_+989111111111", "someone-else", Duration::from_secs(30))
        .await
        .unwrap();

    assert!(!service.validate_code(PHONE, &code).await);
    assert!(cache.peek("verification_code_+989111111111").is_some());
}

#[tokio::test]
async fn test_generate_fails_when_backend_down() {
    let (service, cache, delivery) = create_service();
    cache.set_should_fail(true);

    assert!(service.send_otp_code(PHONE).await.is_err());
    assert!(delivery.sent().is_empty());
}
