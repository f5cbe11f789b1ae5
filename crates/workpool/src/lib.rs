//! # workpool - Fixed-Size Task Execution Pool
//!
//! A bounded-concurrency thread pool for Rust: a fixed set of OS worker
//! threads executing opaque tasks from a lock-protected FIFO queue.
//!
//! ## Features
//!
//! - **Strict FIFO**: tasks start in push order (completion order across
//!   workers is concurrent and unordered)
//! - **Two-phase shutdown**: stop accepting work, drain the queue, join
//!   every worker - no task is silently dropped
//! - **Idle barriers**: `wait_idle` (nothing currently executing) and
//!   `wait_done` (queue drained and nothing executing)
//! - **No surprises**: no work-stealing, no resizing, no capacity bound,
//!   no per-task timeouts - overload grows the queue, a blocking task
//!   occupies its worker until it returns
//!
//! ## Quick Start
//!
//! ```ignore
//! use workpool::TaskPool;
//!
//! fn main() {
//!     let pool = TaskPool::with_workers(4).unwrap();
//!
//!     for i in 0..100 {
//!         pool.push(move || {
//!             println!("task {} running", i);
//!         }).unwrap();
//!     }
//!
//!     // Block until everything pushed has executed
//!     pool.wait_done();
//!
//!     // Drain and join workers (also happens on drop)
//!     pool.shutdown().unwrap();
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Producers                              │
//! │        push(), wait_idle(), wait_done(), shutdown()         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PoolShared                             │
//! │   one mutex: FIFO queue + counters + shutdown flag          │
//! │   task_available ─ wakes one worker per push                │
//! │   state_changed  ─ wakes barrier/shutdown waiters           │
//! └─────────────────────────────────────────────────────────────┘
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │  Worker   │      │  Worker   │      │  Worker   │
//!    │  Thread   │      │  Thread   │      │  Thread   │
//!    └───────────┘      └───────────┘      └───────────┘
//!       task bodies run outside the lock, in parallel
//! ```

mod config;
mod pool;
mod queue;
mod worker;

pub use config::PoolConfig;
pub use pool::{PoolHandle, TaskPool};

// Re-export core types
pub use workpool_core::{PoolError, PoolResult, Task};
pub use workpool_core::constants::MAX_WORKERS;

// Re-export kprint macros for debug logging
pub use workpool_core::{kprint, kprintln, kerror, kwarn, kinfo, kdebug, ktrace};
pub use workpool_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled};

// Re-export env utilities
pub use workpool_core::{env_get, env_get_bool, env_get_opt};
