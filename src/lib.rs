//! Mini Memoize - A result cache for arbitrary computations
//!
//! Memoizes computations by a key derived from their inputs, with TTL
//! expiration, a bounded store and explicit `no-cache` invalidation.

pub mod api;
pub mod cache;
pub mod call;
pub mod config;
pub mod error;
pub mod key;
pub mod memoize;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use call::{Arg, Call};
pub use config::Config;
pub use error::CacheError;
pub use key::{CacheControl, CacheKey, KeyStrategy, RequestView};
pub use memoize::{CallSite, Memoize, Memoized};
pub use tasks::spawn_sweep_task;
