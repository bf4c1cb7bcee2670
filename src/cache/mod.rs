//! Cache Module
//!
//! Result storage with TTL expiry and expiry-ranked eviction.

mod clock;
mod entry;
mod evictor;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use evictor::{Evictor, SweepReport};
pub use store::CacheStore;

// == Public Constants ==
/// Default time to live in seconds
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default maximum number of stored results
pub const DEFAULT_MAX_ITEMS: usize = 128;
