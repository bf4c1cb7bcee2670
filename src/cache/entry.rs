//! Cache Entry Module
//!
//! Defines a stored computation result together with its expiry timestamp.

use std::time::Duration;

use crate::cache::clock::duration_to_ms;

// == Cache Entry ==
/// A memoized result and the moment it stops being valid.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// The stored result
    pub value: V,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` after `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The result to store
    /// * `now_ms` - Insertion time in Unix milliseconds
    /// * `ttl` - Time to live
    pub fn new(value: V, now_ms: u64, ttl: Duration) -> Self {
        Self {
            expires_at: now_ms.saturating_add(duration_to_ms(ttl)),
            value,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time reaches
    /// its expiration time, so a zero TTL entry is never served.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms`, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}
