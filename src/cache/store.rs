//! Cache Store Module
//!
//! Mapping from cache key to stored result and expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheEntry, Clock, SystemClock};
use crate::key::CacheKey;

// == Cache Store ==
/// Key to (expiry, value) storage.
///
/// The store itself never evicts; size and expiry are enforced by
/// [`Evictor::sweep`](crate::cache::Evictor::sweep).
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// Time source for stamping entries
    clock: Arc<dyn Clock>,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    // == Get ==
    /// Looks up an entry without touching it.
    ///
    /// Expired entries are returned as-is; callers decide freshness.
    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Put ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Any existing entry for the key is overwritten.
    pub fn put(&mut self, key: CacheKey, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.entries.insert(key, entry);
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether one was present.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Keys By Expiry ==
    /// Returns all keys ordered by ascending expiry, soonest first.
    ///
    /// Keys sharing an expiry come out in no particular order.
    pub fn keys_by_expiry(&self) -> Vec<CacheKey> {
        let mut keys: Vec<(u64, &CacheKey)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.expires_at, key))
            .collect();
        keys.sort_by_key(|(expires_at, _)| *expires_at);
        keys.into_iter().map(|(_, key)| key.clone()).collect()
    }

    /// Returns the current time according to the store's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
