//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ITEMS, DEFAULT_TTL_SECS};
use crate::key::KeyStrategy;

/// Shortest accepted background sweep interval in seconds
pub const MIN_SWEEP_INTERVAL_SECS: u64 = 1;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Time to live in seconds for stored results
    pub ttl: u64,
    /// Maximum number of results the cache can hold
    pub max_items: usize,
    /// Default key strategy
    pub key_strategy: KeyStrategy,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMOIZE_TTL` - TTL in seconds (default: 300)
    /// - `MEMOIZE_MAX_ITEMS` - Maximum cached results (default: 128)
    /// - `MEMOIZE_KEY_STRATEGY` - `args` or `request` (default: args)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1, minimum: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: env::var("MEMOIZE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl),
            max_items: env::var("MEMOIZE_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_items),
            key_strategy: env::var("MEMOIZE_KEY_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.key_strategy),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs.max(MIN_SWEEP_INTERVAL_SECS))
                .unwrap_or(defaults.sweep_interval),
        }
    }

    /// Returns the TTL as a `Duration`.
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_SECS,
            max_items: DEFAULT_MAX_ITEMS,
            key_strategy: KeyStrategy::ByArguments,
            server_port: 3000,
            sweep_interval: 1,
        }
    }
}
