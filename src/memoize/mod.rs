//! Memoize Module
//!
//! Wraps computations so repeated calls with equivalent inputs are served
//! from a shared, bounded, expiring result store.
//!
//! # Call flow
//! 1. Resolve the call site's TTL and key strategy (done once, at wrap time)
//! 2. Derive the key and cache directive
//! 3. On `no-cache`, drop the stored result for that key
//! 4. Serve a fresh stored result, or drop a stale one
//! 5. On a miss, run the computation and store its result
//! 6. Sweep expired and excess entries
//!
//! The store lock is released while the computation runs. Two concurrent
//! misses on one key both compute and the later write wins.

mod wrapper;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStore, Clock, Evictor, SweepReport, SystemClock};
use crate::call::Call;
use crate::config::Config;
use crate::error::CacheError;
use crate::key::{CacheKey, KeyStrategy};

pub use wrapper::{CallSite, Memoized};

// == Memoize ==
/// A memoization cache shared by every computation it wraps.
///
/// Cloning is cheap and yields a handle to the same store. Separate
/// `Memoize` values never share a store.
pub struct Memoize<V> {
    inner: Arc<Shared<V>>,
}

struct Shared<V> {
    store: Mutex<CacheStore<V>>,
    evictor: Evictor,
    ttl: Duration,
    key_strategy: KeyStrategy,
    clear_next_key: AtomicBool,
}

impl<V> Clone for Memoize<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> Memoize<V> {
    // == Constructor ==
    /// Creates a cache on the system clock.
    ///
    /// # Arguments
    /// * `ttl` - Default time to live for stored results
    /// * `max_items` - Maximum number of stored results after each sweep
    /// * `key_strategy` - Default key strategy
    pub fn new(ttl: Duration, max_items: usize, key_strategy: KeyStrategy) -> Self {
        Self::with_clock(ttl, max_items, key_strategy, Arc::new(SystemClock))
    }

    /// Creates a cache on the given clock.
    pub fn with_clock(
        ttl: Duration,
        max_items: usize,
        key_strategy: KeyStrategy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                store: Mutex::new(CacheStore::with_clock(clock)),
                evictor: Evictor::new(max_items),
                ttl,
                key_strategy,
                clear_next_key: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ttl_duration(),
            config.max_items,
            config.key_strategy.clone(),
        )
    }

    // == Wrap ==
    /// Wraps `computation` with this cache's default TTL and key strategy.
    pub fn wrap<F>(&self, computation: F) -> Memoized<V, F> {
        self.site().wrap(computation)
    }

    /// Starts a call site whose TTL or key strategy may differ from the
    /// defaults. Overrides never change the shared configuration.
    pub fn site(&self) -> CallSite<V> {
        CallSite::new(self.clone())
    }

    // == Clear Next Key ==
    /// Forces the next `args` derivation to invalidate its key.
    ///
    /// The flag is consumed by whichever call derives a key next, on any
    /// thread and through any wrapped computation, so concurrent callers can
    /// steal each other's request. Prefer [`Call::no_cache`], which only
    /// affects its own call.
    pub fn clear_next_key(&self) {
        self.inner.clear_next_key.store(true, Ordering::SeqCst);
    }

    // == Sweep ==
    /// Drops expired entries and trims the store to `max_items`.
    pub fn sweep(&self) -> SweepReport {
        let mut store = self.inner.store.lock();
        self.inner.evictor.sweep(&mut *store)
    }

    /// Removes the stored result for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.inner.store.lock().remove(key)
    }

    /// Removes every stored result.
    pub fn clear(&self) {
        self.inner.store.lock().clear();
    }

    /// Returns true if a result is stored under `key`, fresh or not.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.store.lock().get(key).is_some()
    }

    /// Returns the number of stored results, including stale ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    /// Returns true if no results are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.store.lock().is_empty()
    }

    /// Returns the default TTL applied by `wrap`.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Returns the capacity enforced after each sweep.
    pub fn max_items(&self) -> usize {
        self.inner.evictor.max_items()
    }

    /// Returns the default key strategy applied by `wrap`.
    pub fn key_strategy(&self) -> &KeyStrategy {
        &self.inner.key_strategy
    }

    // == Execute ==
    /// Runs one call through the cache.
    pub(crate) fn execute<E, F>(
        &self,
        call: &Call,
        ttl: Duration,
        key_strategy: &KeyStrategy,
        computation: &F,
    ) -> Result<V, E>
    where
        F: Fn(&Call) -> Result<V, E>,
        E: From<CacheError>,
    {
        let shared = &self.inner;

        // Reset on every derivation, whatever the strategy or outcome
        let clear_next_key = shared.clear_next_key.swap(false, Ordering::SeqCst);
        let derived = key_strategy.derive(call, clear_next_key)?;
        let invalidate = derived.is_no_cache() || call.wants_no_cache();

        if let Some(key) = &derived.key {
            let mut store = shared.store.lock();

            if invalidate && store.remove(key) {
                debug!(%key, "Cache entry invalidated by no-cache directive");
            }

            match store.get(key) {
                Some(entry) => {
                    let now = store.now_ms();
                    if !entry.is_expired_at(now) {
                        debug!(%key, remaining_ms = entry.ttl_remaining_ms(now), "Cache hit");
                        let value = entry.value.clone();
                        shared.evictor.sweep(&mut *store);
                        return Ok(value);
                    }
                    store.remove(key);
                    debug!(%key, "Cache entry expired, recomputing");
                }
                None => debug!(%key, "Cache miss"),
            }
        }

        let value = match computation(call) {
            Ok(value) => value,
            Err(err) => {
                debug!(key = ?derived.key, "Computation failed, nothing stored");
                return Err(err);
            }
        };

        let mut store = shared.store.lock();
        if let Some(key) = derived.key {
            store.put(key, value.clone(), ttl);
        }
        shared.evictor.sweep(&mut *store);
        Ok(value)
    }
}

impl<V: Clone> Default for Memoize<V> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::sync::atomic::AtomicUsize;

    fn memoize_at(ttl_secs: u64, max_items: usize) -> (Memoize<i64>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let memo = Memoize::with_clock(
            Duration::from_secs(ttl_secs),
            max_items,
            KeyStrategy::ByArguments,
            clock.clone(),
        );
        (memo, clock)
    }

    fn doubler(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(&Call) -> Result<i64, CacheError> + Clone {
        move |call: &Call| {
            counter.fetch_add(1, Ordering::SeqCst);
            let x = call.args()[0].as_i64().unwrap_or_default();
            Ok(x * 2)
        }
    }

    #[test]
    fn test_defaults() {
        let memo: Memoize<i64> = Memoize::default();
        assert_eq!(memo.ttl(), Duration::from_secs(300));
        assert_eq!(memo.max_items(), 128);
        assert_eq!(memo.key_strategy().to_string(), "args");
        assert!(memo.is_empty());
    }

    #[test]
    fn test_repeat_call_hits() {
        let (memo, _) = memoize_at(5, 2);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo.wrap(doubler(counter.clone()));

        assert_eq!(f.call(&Call::new().arg(3)), Ok(6));
        assert_eq!(f.call(&Call::new().arg(3)), Ok(6));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(memo.contains(&CacheKey::digest("3")));
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let (memo, clock) = memoize_at(5, 2);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo.wrap(doubler(counter.clone()));

        f.call(&Call::new().arg(3)).unwrap();
        clock.advance(Duration::from_millis(4_999));
        f.call(&Call::new().arg(3)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_millis(2));
        f.call(&Call::new().arg(3)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_call_token_invalidates_only_its_key() {
        let (memo, _) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo.wrap(doubler(counter.clone()));

        f.call(&Call::new().arg(1)).unwrap();
        f.call(&Call::new().arg(2)).unwrap();
        f.call(&Call::new().arg(1).no_cache()).unwrap();
        f.call(&Call::new().arg(2)).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clear_next_key_is_one_shot() {
        let (memo, _) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo.wrap(doubler(counter.clone()));

        f.call(&Call::new().arg(7)).unwrap();
        memo.clear_next_key();
        f.call(&Call::new().arg(7)).unwrap();
        f.call(&Call::new().arg(7)).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_computation_is_not_stored() {
        let (memo, _) = memoize_at(60, 10);
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_in = attempts.clone();
        let f = memo.wrap(move |_: &Call| -> Result<i64, CacheError> {
            attempts_in.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::InvalidRequest("boom".to_string()))
        });

        assert!(f.call(&Call::new().arg(1)).is_err());
        assert!(memo.is_empty());
        assert!(f.call(&Call::new().arg(1)).is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_none_key_is_never_stored() {
        let (memo, _) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo
            .site()
            .key_strategy(KeyStrategy::custom(|_| (None, None)))
            .wrap(doubler(counter.clone()));

        f.call(&Call::new().arg(1)).unwrap();
        f.call(&Call::new().arg(1)).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(memo.is_empty());
    }

    #[test]
    fn test_key_derivation_error_reaches_caller() {
        let (memo, _) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo
            .site()
            .key_strategy(KeyStrategy::ByRequestQuery)
            .wrap(doubler(counter.clone()));

        let result = f.call(&Call::new().arg(1));

        assert!(matches!(result, Err(CacheError::KeyDerivation(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stored_expiry_governs_freshness() {
        let (memo, clock) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let long = memo.wrap(doubler(counter.clone()));
        let short = memo
            .site()
            .ttl(Duration::from_secs(1))
            .wrap(doubler(counter.clone()));

        long.call(&Call::new().arg(5)).unwrap();
        clock.advance(Duration::from_secs(30));

        // Same key through a shorter-TTL site: still fresh under the stored expiry
        short.call(&Call::new().arg(5)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(memo.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_hit_sweeps_expired_entries() {
        let (memo, clock) = memoize_at(60, 10);
        let counter = Arc::new(AtomicUsize::new(0));
        let long = memo.wrap(doubler(counter.clone()));
        let short = memo
            .site()
            .ttl(Duration::from_secs(1))
            .wrap(doubler(counter.clone()));

        short.call(&Call::new().arg(1)).unwrap();
        long.call(&Call::new().arg(2)).unwrap();
        clock.advance(Duration::from_secs(2));

        assert_eq!(long.call(&Call::new().arg(2)), Ok(4));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(!memo.contains(&CacheKey::digest("1")));
        assert!(memo.contains(&CacheKey::digest("2")));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_hit_enforces_capacity() {
        let (memo, clock) = memoize_at(60, 2);
        let counter = Arc::new(AtomicUsize::new(0));
        let f = memo.wrap(doubler(counter.clone()));

        f.call(&Call::new().arg(1)).unwrap();
        clock.advance(Duration::from_secs(1));
        f.call(&Call::new().arg(2)).unwrap();

        // Over capacity without going through a miss
        memo.inner
            .store
            .lock()
            .put(CacheKey::digest("3"), 6, Duration::from_secs(120));
        assert_eq!(memo.len(), 3);

        assert_eq!(f.call(&Call::new().arg(2)), Ok(4));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 2);
        assert!(!memo.contains(&CacheKey::digest("1")));
        assert!(memo.contains(&CacheKey::digest("2")));
        assert!(memo.contains(&CacheKey::digest("3")));
    }

    #[test]
    fn test_manual_sweep_and_clear() {
        let (memo, clock) = memoize_at(5, 10);
        let f = memo.wrap(doubler(Arc::new(AtomicUsize::new(0))));

        f.call(&Call::new().arg(1)).unwrap();
        f.call(&Call::new().arg(2)).unwrap();
        assert_eq!(memo.len(), 2);

        clock.advance(Duration::from_secs(5));
        assert_eq!(memo.sweep().expired, 2);
        assert!(memo.is_empty());

        f.call(&Call::new().arg(1)).unwrap();
        assert!(memo.invalidate(&CacheKey::digest("1")));
        f.call(&Call::new().arg(2)).unwrap();
        memo.clear();
        assert!(memo.is_empty());
    }
}
