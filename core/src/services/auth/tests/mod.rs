//! Tests for the authentication flow
