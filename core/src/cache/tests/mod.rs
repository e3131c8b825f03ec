//! Tests for the cache contract helpers
