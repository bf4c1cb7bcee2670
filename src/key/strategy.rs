//! Key Strategy Module
//!
//! The closed set of ways a call's inputs become a cache key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::trace;

use crate::call::Call;
use crate::error::{CacheError, Result};
use crate::key::{
    CacheControl, CacheKey, DerivedKey, CACHE_CONTROL_HEADER, NO_CACHE, PAGINATION_KEYS,
};

/// User-supplied key function returning `(key, cache_control)`.
///
/// `cache_control` must be `None` or `Some("no-cache")`. A `None` key means
/// the call is computed but never stored.
pub type CustomKeyFn = Arc<dyn Fn(&Call) -> (Option<String>, Option<String>) + Send + Sync>;

// == Key Strategy ==
/// How keys are derived for a memoized computation.
#[derive(Clone, Default)]
pub enum KeyStrategy {
    /// Digest of the accepted-type positional arguments
    #[default]
    ByArguments,
    /// Digest of the query parameters of a request passed as first argument
    ByRequestQuery,
    /// Caller-provided key function
    Custom(CustomKeyFn),
}

impl KeyStrategy {
    /// Wraps a closure as a custom strategy.
    pub fn custom<F>(key_fn: F) -> Self
    where
        F: Fn(&Call) -> (Option<String>, Option<String>) + Send + Sync + 'static,
    {
        KeyStrategy::Custom(Arc::new(key_fn))
    }

    // == Derive ==
    /// Derives the key and cache directive for `call`.
    ///
    /// `clear_next_key` is the one-shot flag set through
    /// [`Memoize::clear_next_key`](crate::Memoize::clear_next_key); only the
    /// `args` strategy turns it into a `no-cache` directive.
    pub fn derive(&self, call: &Call, clear_next_key: bool) -> Result<DerivedKey> {
        let derived = match self {
            KeyStrategy::ByArguments => DerivedKey {
                key: Some(args_key(call)),
                control: clear_next_key.then_some(CacheControl::NoCache),
            },
            KeyStrategy::ByRequestQuery => request_key(call)?,
            KeyStrategy::Custom(key_fn) => {
                let (key, control) = key_fn(call);
                DerivedKey {
                    key: key.map(CacheKey::from),
                    control: parse_custom_control(control)?,
                }
            }
        };

        trace!(strategy = %self, key = ?derived.key, control = ?derived.control, "key derived");
        Ok(derived)
    }
}

/// Concatenates the accepted positional inputs and digests them.
///
/// With no accepted inputs the key is the digest of the empty string, so
/// all such calls share one slot.
fn args_key(call: &Call) -> CacheKey {
    let material: String = call
        .args()
        .iter()
        .filter(|arg| arg.is_key_material())
        .map(ToString::to_string)
        .collect();
    CacheKey::digest(&material)
}

fn request_key(call: &Call) -> Result<DerivedKey> {
    let request = call
        .args()
        .first()
        .and_then(|arg| arg.as_request())
        .ok_or_else(|| {
            CacheError::KeyDerivation(
                "request strategy needs a request as the first argument".to_string(),
            )
        })?;

    let control = request
        .header(CACHE_CONTROL_HEADER)
        .and_then(|value| CacheControl::from_header(&value));

    let material: String = request
        .query_params()?
        .into_iter()
        .filter(|(name, _)| !PAGINATION_KEYS.contains(&name.as_str()))
        .map(|(_, value)| value)
        .collect();

    Ok(DerivedKey {
        key: Some(CacheKey::digest(&material)),
        control,
    })
}

fn parse_custom_control(control: Option<String>) -> Result<Option<CacheControl>> {
    match control.as_deref() {
        None => Ok(None),
        Some(NO_CACHE) => Ok(Some(CacheControl::NoCache)),
        Some(other) => Err(CacheError::ContractViolation(format!(
            "cache_control must be None or \"{}\", got \"{}\"",
            NO_CACHE, other
        ))),
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyStrategy::ByArguments => "args",
            KeyStrategy::ByRequestQuery => "request",
            KeyStrategy::Custom(_) => "custom",
        };
        f.write_str(name)
    }
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyStrategy({})", self)
    }
}

impl FromStr for KeyStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "args" => Ok(KeyStrategy::ByArguments),
            "request" => Ok(KeyStrategy::ByRequestQuery),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown key strategy '{}', expected 'args' or 'request'",
                other
            ))),
        }
    }
}
