//! Unit tests for the Redis rate limiter helpers

use crate::cache::rate_limiter::{hash_key, retry_after_seconds};

#[test]
fn test_retry_after_rounds_up() {
    // Oldest entry leaves the window in 14.2s
    assert_eq!(retry_after_seconds(1_000, 60_000, 46_800), 15);
    assert_eq!(retry_after_seconds(0, 60_000, 0), 60);
}

#[test]
fn test_retry_after_is_at_least_one_second() {
    assert_eq!(retry_after_seconds(0, 1_000, 5_000), 1);
    assert_eq!(retry_after_seconds(0, 1_000, 999), 1);
}

#[test]
fn test_key_hash_hides_subject() {
    let hashed = hash_key("email_confirm:alice@example.com");
    assert_eq!(hashed.len(), 64);
    assert!(!hashed.contains("alice"));
    assert_eq!(hashed, hash_key("email_confirm:alice@example.com"));
    assert_ne!(hashed, hash_key("email_confirm:bob@example.com"));
}
