//! Worker pool for parallel hashing.
//!
//! One pool per process, sized from `[performance] parallel_threads` the
//! first time [`configure`] runs. A walk that starts before any
//! configuration gets [`default_threads`] workers.

use crate::config::PerformanceConfig;
use crate::error::{TrackError, TrackResult};
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use tracing::debug;

/// Pool shared by every tree walk in the process.
static HASH_POOL: OnceCell<ThreadPool> = OnceCell::new();

/// Upper bound for the default worker count.
const MAX_DEFAULT_THREADS: usize = 8;

/// Default worker count: available parallelism capped at 8.
#[must_use]
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(MAX_DEFAULT_THREADS)
}

fn build(threads: usize) -> TrackResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("treemark-hash-{i}"))
        .build()
        .map_err(|e| TrackError::Io {
            context: format!("starting {threads} hashing threads"),
            source: std::io::Error::other(e),
        })
}

/// Start the pool with the configured size and return the size in effect.
///
/// The pool is created once; a later call with a different size keeps the
/// running pool.
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the worker threads cannot be spawned.
pub fn configure(performance: &PerformanceConfig) -> TrackResult<usize> {
    let pool = HASH_POOL.get_or_try_init(|| build(performance.parallel_threads))?;
    let running = pool.current_num_threads();
    if running != performance.parallel_threads {
        debug!(
            configured = performance.parallel_threads,
            running, "hash pool already running, keeping its size"
        );
    }
    Ok(running)
}

/// Run `f` on the hash pool, starting it with defaults if needed.
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the pool has to be started and cannot be.
pub fn run_in_pool<F, R>(f: F) -> TrackResult<R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let pool = HASH_POOL.get_or_try_init(|| build(default_threads()))?;
    Ok(pool.install(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_run_in_pool_returns_value() -> Result<()> {
        let sum: u32 = run_in_pool(|| (1..=10).sum())?;
        assert_eq!(sum, 55);
        Ok(())
    }

    #[test]
    fn test_work_runs_on_hash_threads() -> Result<()> {
        let name = run_in_pool(|| std::thread::current().name().map(str::to_owned))?;
        assert!(name.is_some_and(|n| n.starts_with("treemark-hash-")));
        Ok(())
    }

    #[test]
    fn test_configure_reports_running_size() -> Result<()> {
        let performance = PerformanceConfig::default();
        let running = configure(&performance)?;
        assert!(running >= 1);
        // Second call keeps the same pool
        assert_eq!(configure(&performance)?, running);
        Ok(())
    }

    #[test]
    fn test_default_threads_bounds() {
        let n = default_threads();
        assert!((1..=MAX_DEFAULT_THREADS).contains(&n));
    }
}
