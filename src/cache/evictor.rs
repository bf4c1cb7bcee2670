//! Evictor Module
//!
//! Enforces TTL expiry and the item bound on a cache store.
//!
//! Entries are ranked by expiry, not by access: a hit never refreshes an
//! entry's position, and the one closest to expiring goes first.

use tracing::debug;

use crate::cache::CacheStore;

// == Sweep Report ==
/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries dropped because their TTL elapsed
    pub expired: usize,
    /// Entries dropped to get back under the item bound
    pub evicted: usize,
}

impl SweepReport {
    /// Total number of entries removed.
    pub fn removed(&self) -> usize {
        self.expired + self.evicted
    }
}

// == Evictor ==
/// Expiry and size enforcement for a [`CacheStore`].
#[derive(Debug, Clone, Copy)]
pub struct Evictor {
    /// Maximum number of entries left after a sweep
    max_items: usize,
}

impl Evictor {
    // == Constructor ==
    /// Creates an evictor bounding stores to `max_items` entries.
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    // == Sweep ==
    /// Drops every expired entry, then the soonest-expiring entries until the
    /// store holds at most `max_items`.
    pub fn sweep<V>(&self, store: &mut CacheStore<V>) -> SweepReport {
        let expired = store.cleanup_expired();

        let mut evicted = 0;
        if store.len() > self.max_items {
            let excess = store.len() - self.max_items;
            for key in store.keys_by_expiry().into_iter().take(excess) {
                if store.remove(&key) {
                    evicted += 1;
                }
            }
        }

        let report = SweepReport { expired, evicted };
        if report.removed() > 0 {
            debug!(
                expired = report.expired,
                evicted = report.evicted,
                remaining = store.len(),
                "Cache sweep removed entries"
            );
        }
        report
    }
}
