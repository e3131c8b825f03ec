//! Tests for the block service
