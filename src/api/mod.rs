//! API Module
//!
//! HTTP handlers and routing for the demo service built on the cache.
//!
//! # Endpoints
//! - `GET /fib/:n` - Fibonacci number, memoized by argument
//! - `GET /lookup` - Query echo, memoized by query string
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
