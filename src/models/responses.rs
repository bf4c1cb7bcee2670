//! Response DTOs for the demo API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

/// Response body for GET /fib/:n
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibResponse {
    /// Requested position in the sequence
    pub n: i64,
    /// Fibonacci number at position `n`
    pub value: u64,
    /// When the value was computed (RFC 3339); unchanged on cache hits
    pub computed_at: String,
}

impl FibResponse {
    /// Creates a new FibResponse stamped with the current time
    pub fn new(n: i64, value: u64) -> Self {
        Self {
            n,
            value,
            computed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    /// Query filters the result was computed for, pagination excluded
    pub filters: BTreeMap<String, String>,
    /// When the result was computed (RFC 3339); unchanged on cache hits
    pub computed_at: String,
}

impl LookupResponse {
    /// Creates a new LookupResponse stamped with the current time
    pub fn new(filters: BTreeMap<String, String>) -> Self {
        Self {
            filters,
            computed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
