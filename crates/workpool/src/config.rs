//! Pool configuration

use workpool_core::constants::MAX_WORKERS;
use workpool_core::error::{PoolError, PoolResult};

/// Configuration for a task pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads (defaults to CPU count)
    pub num_workers: usize,

    /// Prefix for worker thread names ("<prefix>-<id>")
    pub thread_name_prefix: String,

    /// Enable debug logging in the dispatch loop
    pub debug_logging: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let num_cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            num_workers: num_cpus.min(MAX_WORKERS),
            thread_name_prefix: "workpool-worker".to_string(),
            debug_logging: false,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of worker threads
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Set the worker thread name prefix
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Enable debug logging
    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    /// Validate configuration
    ///
    /// A zero worker count is rejected outright: a pool with no workers
    /// would accept pushes that can never execute, and shutdown would
    /// return without draining.
    pub fn validate(&self) -> PoolResult<()> {
        if self.num_workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        if self.num_workers > MAX_WORKERS {
            return Err(PoolError::TooManyWorkers);
        }
        Ok(())
    }
}
