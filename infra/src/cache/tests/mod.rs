//! Tests for cache store implementations
