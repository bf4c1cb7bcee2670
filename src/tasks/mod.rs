//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - Cache sweep: removes expired and excess results at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
