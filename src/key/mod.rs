//! Key Module
//!
//! Turns a call's inputs into a cache key plus an optional invalidation
//! directive, using one of several interchangeable strategies.

mod request;
mod strategy;

use std::fmt;

use md5::{Digest, Md5};

pub use request::RequestView;
pub use strategy::{CustomKeyFn, KeyStrategy};

// == Public Constants ==
/// Header carrying the client's cache directive (matched case-insensitively)
pub const CACHE_CONTROL_HEADER: &str = "CACHE-CONTROL";

/// Query parameters that never take part in a request key
pub const PAGINATION_KEYS: [&str; 2] = ["page", "page_size"];

/// The only directive value the cache reacts to
pub const NO_CACHE: &str = "no-cache";

// == Cache Key ==
/// Opaque identifier of one distinct set of call inputs under one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for `material` as a lowercase hex MD5 digest.
    pub fn digest(material: &str) -> Self {
        Self(hex::encode(Md5::digest(material.as_bytes())))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Cache Control ==
/// Directive forcing invalidation of the derived key before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControl {
    /// Drop any stored result for this key and recompute
    NoCache,
}

impl CacheControl {
    /// Interprets a header value. Only an exact `no-cache` counts.
    pub fn from_header(value: &str) -> Option<Self> {
        (value == NO_CACHE).then_some(CacheControl::NoCache)
    }

    /// Returns the wire form of the directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheControl::NoCache => NO_CACHE,
        }
    }
}

// == Derived Key ==
/// Outcome of key derivation for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    /// Key to look up and store under; `None` disables caching for the call
    pub key: Option<CacheKey>,
    /// Invalidation directive for that key
    pub control: Option<CacheControl>,
}

impl DerivedKey {
    /// Returns true if the key must be invalidated before lookup.
    pub fn is_no_cache(&self) -> bool {
        self.control == Some(CacheControl::NoCache)
    }
}
