//! Tests for SMS services

#[cfg(test)]
mod mock_sms_tests;
