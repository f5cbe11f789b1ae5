//! Worker thread management
//!
//! Workers are OS threads running the dispatch loop: wait for work or
//! shutdown, dequeue one task, execute it outside the lock, repeat.
//!
//! State machine per worker:
//! - Waiting -> Running: the queue is non-empty
//! - Waiting -> Exited: shutdown is set and the queue is empty
//! - Running -> Waiting: the task body returned and the node was dropped

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use workpool_core::kprint;
use workpool_core::{kdebug, kerror};

use crate::queue::PoolShared;

/// A spawned worker thread.
pub(crate) struct Worker {
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawn a named worker thread running the dispatch loop.
    ///
    /// The `alive` slot must already be reserved by the creator; the loop
    /// releases it on exit.
    pub(crate) fn spawn(
        id: usize,
        name_prefix: &str,
        shared: Arc<PoolShared>,
        debug: bool,
    ) -> io::Result<Worker> {
        let handle = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(move || worker_loop(id, shared, debug))?;
        Ok(Worker { handle })
    }

    /// Wait for the worker thread to terminate.
    pub(crate) fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Worker thread main loop.
fn worker_loop(id: usize, shared: Arc<PoolShared>, debug: bool) {
    kprint::set_worker_id(id as u32);

    if debug {
        kdebug!("started (thread id {:#x})", native_thread_id());
    }

    // `next_task` blocks until work arrives or shutdown drains the queue.
    // Task bodies run with the lock released, so they may push to the pool
    // or block indefinitely; a permanently blocked body permanently removes
    // this worker from the pool.
    while let Some(task) = shared.next_task() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
        if result.is_err() {
            // Contained: the pool has no error channel for task outcomes,
            // and an unwinding body must not take the worker with it.
            kerror!("task panicked, worker continues");
        }
        shared.task_finished();
    }

    if debug {
        kdebug!("shutdown observed, exiting");
    }
    kprint::clear_worker_id();
}

/// Native thread id of the calling thread, for debug logs.
fn native_thread_id() -> u64 {
    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            unsafe { libc::pthread_self() as u64 }
        } else {
            0
        }
    }
}
