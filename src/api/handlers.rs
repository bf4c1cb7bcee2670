//! API Handlers
//!
//! HTTP request handlers for the demo service, each serving a memoized
//! computation.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    Json,
};

use crate::call::{Arg, Call};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::key::{CacheControl, KeyStrategy, PAGINATION_KEYS};
use crate::memoize::{Memoize, Memoized};
use crate::models::{FibResponse, HealthResponse, LookupResponse};

/// Largest Fibonacci position whose value fits in a `u64`
pub const MAX_FIB_POSITION: i64 = 93;

pub type FibFn = fn(&Call) -> Result<FibResponse>;
pub type LookupFn = fn(&Call) -> Result<LookupResponse>;

/// Application state shared across all handlers.
///
/// Holds the memoized computations; each owns a handle to its cache.
#[derive(Clone)]
pub struct AppState {
    /// Fibonacci numbers keyed by position
    pub fib: Memoized<FibResponse, FibFn>,
    /// Lookups keyed by query string
    pub lookup: Memoized<LookupResponse, LookupFn>,
}

impl AppState {
    /// Creates a new AppState over the given caches.
    pub fn new(fib_cache: Memoize<FibResponse>, lookup_cache: Memoize<LookupResponse>) -> Self {
        Self {
            fib: fib_cache
                .site()
                .key_strategy(KeyStrategy::ByArguments)
                .wrap(fibonacci as FibFn),
            lookup: lookup_cache
                .site()
                .key_strategy(KeyStrategy::ByRequestQuery)
                .wrap(lookup as LookupFn),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Each endpoint gets its own cache so their keys never collide.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Memoize::from_config(config), Memoize::from_config(config))
    }
}

// == Computations ==
/// Computes the Fibonacci number at the position given as first argument.
pub fn fibonacci(call: &Call) -> Result<FibResponse> {
    let n = call
        .args()
        .first()
        .and_then(Arg::as_i64)
        .ok_or_else(|| CacheError::InvalidRequest("Expected an integer position".to_string()))?;

    if !(0..=MAX_FIB_POSITION).contains(&n) {
        return Err(CacheError::InvalidRequest(format!(
            "Position must be between 0 and {}",
            MAX_FIB_POSITION
        )));
    }

    let (mut a, mut b) = (0u128, 1u128);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }

    let value = u64::try_from(a)
        .map_err(|_| CacheError::InvalidRequest(format!("fib({}) does not fit in u64", n)))?;
    Ok(FibResponse::new(n, value))
}

/// Echoes the non-pagination query filters of the request given as first argument.
pub fn lookup(call: &Call) -> Result<LookupResponse> {
    let request = call
        .args()
        .first()
        .and_then(Arg::as_request)
        .ok_or_else(|| CacheError::InvalidRequest("Expected a request".to_string()))?;

    let filters = request
        .query_params()?
        .into_iter()
        .filter(|(name, _)| !PAGINATION_KEYS.contains(&name.as_str()))
        .collect();

    Ok(LookupResponse::new(filters))
}

fn requests_no_cache(headers: &HeaderMap) -> bool {
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .and_then(CacheControl::from_header)
        .is_some()
}

/// Handler for GET /fib/:n
///
/// Serves Fibonacci numbers keyed by the position argument. A
/// `Cache-Control: no-cache` header forces recomputation for this call.
pub async fn fib_handler(
    State(state): State<AppState>,
    Path(n): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<FibResponse>> {
    let call = Call::new()
        .arg(n)
        .with_no_cache(requests_no_cache(&headers));

    Ok(Json(state.fib.call(&call)?))
}

/// Handler for GET /lookup
///
/// Serves results keyed by the query string, ignoring `page` and
/// `page_size`. The request's own `Cache-Control` header is honoured by the
/// key strategy.
pub async fn lookup_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<LookupResponse>> {
    let (parts, _body) = request.into_parts();
    let call = Call::with_request(parts);

    Ok(Json(state.lookup.call(&call)?))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
