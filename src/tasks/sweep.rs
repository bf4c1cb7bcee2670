//! Sweep Task
//!
//! Background task that periodically sweeps a memoization cache, so results
//! expire even when no calls arrive to trigger the sweep.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::MIN_SWEEP_INTERVAL_SECS;
use crate::memoize::Memoize;

/// Spawns a background task that periodically sweeps the cache.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep takes the store lock only for its own duration.
///
/// # Arguments
/// * `memo` - Handle to the cache to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let memo: Memoize<String> = Memoize::default();
/// let sweep_handle = spawn_sweep_task(memo.clone(), 1);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(memo: Memoize<V>, sweep_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    let interval = Duration::from_secs(sweep_interval_secs.max(MIN_SWEEP_INTERVAL_SECS));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = memo.sweep();

            if report.removed() > 0 {
                info!(
                    "Cache sweep: removed {} expired and {} excess entries",
                    report.expired, report.evicted
                );
            } else {
                debug!("Cache sweep: nothing to remove");
            }
        }
    })
}
