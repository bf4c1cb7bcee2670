//! Wrapped computations and per-site overrides.

use std::time::Duration;

use crate::call::Call;
use crate::error::CacheError;
use crate::key::KeyStrategy;
use crate::memoize::Memoize;

// == Call Site ==
/// Builder for a wrapped computation with its own TTL or key strategy.
///
/// ```
/// use std::time::Duration;
/// use mini_memoize::{Call, CacheError, Memoize};
///
/// let memo: Memoize<i64> = Memoize::default();
/// let in_classroom = memo
///     .site()
///     .ttl(Duration::from_secs(5))
///     .wrap(|call: &Call| -> Result<i64, CacheError> { Ok(call.args().len() as i64) });
///
/// assert_eq!(in_classroom.call(&Call::new().arg("north")), Ok(1));
/// assert_eq!(memo.ttl(), Duration::from_secs(300));
/// ```
#[derive(Clone)]
pub struct CallSite<V> {
    memo: Memoize<V>,
    ttl: Option<Duration>,
    key_strategy: Option<KeyStrategy>,
}

impl<V: Clone> CallSite<V> {
    pub(crate) fn new(memo: Memoize<V>) -> Self {
        Self {
            memo,
            ttl: None,
            key_strategy: None,
        }
    }

    /// Overrides the TTL for results stored through this site.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Overrides the key strategy for calls through this site.
    pub fn key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = Some(key_strategy);
        self
    }

    /// Wraps `computation`, fixing the effective TTL and strategy.
    pub fn wrap<F>(self, computation: F) -> Memoized<V, F> {
        let ttl = self.ttl.unwrap_or_else(|| self.memo.ttl());
        let key_strategy = self
            .key_strategy
            .unwrap_or_else(|| self.memo.key_strategy().clone());

        Memoized {
            memo: self.memo,
            ttl,
            key_strategy,
            computation,
        }
    }
}

// == Memoized ==
/// A computation whose results are served from a [`Memoize`] cache.
#[derive(Clone)]
pub struct Memoized<V, F> {
    memo: Memoize<V>,
    ttl: Duration,
    key_strategy: KeyStrategy,
    computation: F,
}

impl<V: Clone, F> Memoized<V, F> {
    // == Call ==
    /// Serves `call` from the cache or runs the computation.
    ///
    /// Key derivation failures are converted into the computation's error
    /// type; computation errors are returned as-is and never cached.
    pub fn call<E>(&self, call: &Call) -> Result<V, E>
    where
        F: Fn(&Call) -> Result<V, E>,
        E: From<CacheError>,
    {
        self.memo
            .execute(call, self.ttl, &self.key_strategy, &self.computation)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_strategy(&self) -> &KeyStrategy {
        &self.key_strategy
    }

    /// Returns the cache backing this computation.
    pub fn cache(&self) -> &Memoize<V> {
        &self.memo
    }
}
