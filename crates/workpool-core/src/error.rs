//! Error types for pool operations

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur in pool operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Pool was created with zero workers
    NoWorkers,

    /// Worker count exceeds `constants::MAX_WORKERS`
    TooManyWorkers,

    /// Failed to spawn a worker thread (raw OS error code)
    SpawnFailed(i32),

    /// Push observed the shutdown flag
    ShutDown,

    /// A worker thread panicked outside a task body
    WorkerPanicked,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::NoWorkers => write!(f, "pool needs at least one worker"),
            PoolError::TooManyWorkers => write!(f, "worker count exceeds maximum"),
            PoolError::SpawnFailed(code) => write!(f, "worker spawn failed: os error {}", code),
            PoolError::ShutDown => write!(f, "pool is shut down"),
            PoolError::WorkerPanicked => write!(f, "worker thread panicked"),
        }
    }
}

impl std::error::Error for PoolError {}
