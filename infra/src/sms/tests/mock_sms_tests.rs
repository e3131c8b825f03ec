//! Unit tests for mock SMS service

use std::sync::Arc;

use qs_shared::config::SmsConfig;

use crate::sms::{create_sms_service, verification_message, MockSmsService, SmsService};
use crate::InfrastructureError;

const PHONE: &str = "+989123456789";

#[tokio::test]
async fn test_mock_sms_send_success() {
    let service = MockSmsService::new();
    let message_id = service.send_sms(PHONE, "Test message").await.unwrap();

    assert!(message_id.starts_with("mock_"));
    assert_eq!(service.get_message_count(), 1);
    assert_eq!(
        service.sent_messages(),
        vec![(PHONE.to_string(), "Test message".to_string())]
    );
}

#[tokio::test]
async fn test_mock_sms_invalid_phone() {
    let service = MockSmsService::new();
    let result = service.send_sms("09123456789", "Test message").await;

    match result {
        Err(InfrastructureError::Sms(msg)) => assert!(msg.contains("Invalid phone number")),
        other => panic!("Expected Sms error, got {:?}", other),
    }
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_mock_sms_fails_requested_number_of_times() {
    let service = MockSmsService::new();
    service.fail_next(2);

    assert!(service.send_sms(PHONE, "a").await.is_err());
    assert!(service.send_sms(PHONE, "b").await.is_err());
    assert!(service.send_sms(PHONE, "c").await.is_ok());

    assert_eq!(service.get_attempt_count(), 3);
    assert_eq!(service.get_message_count(), 1);
}

#[tokio::test]
async fn test_verification_code_message() {
    let service = MockSmsService::new();
    service.send_verification_code(PHONE, "123456", 2).await.unwrap();

    let (_, message) = &service.sent_messages()[0];
    assert_eq!(
        message,
        "Your QuickSign verification code is: 123456. It expires in 2 minutes."
    );
    assert_eq!(message, &verification_message("123456", 2));
}

#[test]
fn test_create_sms_service_falls_back_to_mock() {
    let config = SmsConfig {
        provider: "carrier-pigeon".to_string(),
        ..SmsConfig::default()
    };
    let service: Arc<dyn SmsService> = create_sms_service(&config);
    assert_eq!(service.provider_name(), "Mock");
}
