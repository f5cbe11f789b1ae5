//! Shared pool state: FIFO queue, counters, and wakeup signals
//!
//! Design:
//! - One mutex guards everything: the queue, both counters, the shutdown flag
//! - `task_available` is signaled once per push (wakes at most one idle
//!   worker) and broadcast at shutdown (every worker must observe the flag)
//! - `state_changed` is broadcast when `executing` reaches 0 and when
//!   `alive` reaches 0; every waiter re-checks its own predicate after a
//!   wake, so sharing one condvar across predicates is safe
//!
//! Task bodies never run under the lock. The critical section covers queue
//! bookkeeping only, so up to N tasks execute in parallel and a task may
//! push to or query the pool without deadlocking.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use workpool_core::error::{PoolError, PoolResult};
use workpool_core::ktrace;
use workpool_core::task::Task;

/// Everything the mutex protects.
///
/// Invariants (hold whenever the lock is free):
/// - `executing <= alive`
/// - `shutdown` transitions false -> true exactly once
/// - once `shutdown` is set, `alive` is non-increasing and reaches 0 only
///   after every worker has seen the flag with an empty queue
struct PoolState {
    queue: VecDeque<Task>,
    executing: usize,
    alive: usize,
    shutdown: bool,
}

/// Shared state between the pool owner, its handles, and the workers.
pub(crate) struct PoolShared {
    state: Mutex<PoolState>,
    task_available: Condvar,
    state_changed: Condvar,
}

impl PoolShared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                executing: 0,
                alive: 0,
                shutdown: false,
            }),
            task_available: Condvar::new(),
            state_changed: Condvar::new(),
        }
    }

    /// Append a task at the tail and wake one idle worker.
    ///
    /// O(1). There is no capacity bound: sustained overload grows the queue
    /// without limit.
    pub(crate) fn push(&self, task: Task) -> PoolResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.shutdown {
            return Err(PoolError::ShutDown);
        }
        state.queue.push_back(task);
        ktrace!(
            "task pushed, queued={} executing={}",
            state.queue.len(),
            state.executing
        );
        // Signaled under the same lock as the queue mutation, so a missed
        // wake is impossible; workers re-check the predicate on wake.
        self.task_available.notify_one();
        Ok(())
    }

    /// Worker side: block until a task is available or shutdown is observed
    /// with an empty queue.
    ///
    /// Returns `None` when the worker must exit; its `alive` slot has
    /// already been released at that point. Otherwise returns the next task
    /// in FIFO order with `executing` already incremented.
    pub(crate) fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock().unwrap();
        while state.queue.is_empty() && !state.shutdown {
            state = self.task_available.wait(state).unwrap();
        }
        if state.shutdown && state.queue.is_empty() {
            state.alive -= 1;
            if state.alive == 0 {
                self.state_changed.notify_all();
            }
            return None;
        }
        let task = state.queue.pop_front()?;
        state.executing += 1;
        ktrace!(
            "task dequeued, queued={} executing={}",
            state.queue.len(),
            state.executing
        );
        Some(task)
    }

    /// Worker side: record completion of a dequeued task.
    pub(crate) fn task_finished(&self) {
        let mut state = self.state.lock().unwrap();
        state.executing -= 1;
        if state.executing == 0 {
            self.state_changed.notify_all();
        }
    }

    /// Block while any task is currently executing.
    ///
    /// Queued-but-not-yet-started tasks do not count: this answers "has
    /// everything currently executing finished", not "is the queue empty".
    pub(crate) fn wait_idle(&self) {
        let mut state = self.state.lock().unwrap();
        while state.executing != 0 {
            state = self.state_changed.wait(state).unwrap();
        }
    }

    /// Block until the queue is drained and nothing is executing.
    pub(crate) fn wait_done(&self) {
        let mut state = self.state.lock().unwrap();
        while state.executing != 0 || !state.queue.is_empty() {
            state = self.state_changed.wait(state).unwrap();
        }
    }

    /// Creator side: reserve an `alive` slot before spawning a worker.
    pub(crate) fn register_worker(&self) {
        let mut state = self.state.lock().unwrap();
        state.alive += 1;
    }

    /// Creator side: release the slot of a worker that never started.
    pub(crate) fn unregister_worker(&self) {
        let mut state = self.state.lock().unwrap();
        state.alive -= 1;
        if state.alive == 0 {
            self.state_changed.notify_all();
        }
    }

    /// Set the shutdown flag and wake every worker so each can observe it.
    ///
    /// Idempotent; the flag never reverts. Workers keep dequeuing until the
    /// queue is empty before they are permitted to exit, so no queued task
    /// is dropped.
    pub(crate) fn begin_shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        if state.shutdown {
            return;
        }
        state.shutdown = true;
        self.task_available.notify_all();
    }

    /// Block until every worker has exited.
    pub(crate) fn wait_all_exited(&self) {
        let mut state = self.state.lock().unwrap();
        while state.alive != 0 {
            state = self.state_changed.wait(state).unwrap();
        }
    }

    pub(crate) fn queued_len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    pub(crate) fn executing_count(&self) -> usize {
        self.state.lock().unwrap().executing
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.state.lock().unwrap().alive
    }
}
