//! Pool lifecycle: create, push, wait, shutdown
//!
//! A `TaskPool` owns the queue and a fixed set of workers. It is created
//! once with an immutable worker count and destroyed exactly once;
//! destruction blocks until every queued task has been executed and every
//! worker has exited. No task is silently dropped.

use std::sync::Arc;

use workpool_core::error::{PoolError, PoolResult};
use workpool_core::kdebug;
use workpool_core::task::Task;

use crate::config::PoolConfig;
use crate::queue::PoolShared;
use crate::worker::Worker;

/// A fixed-size thread pool with a FIFO task queue.
///
/// Tasks are started in push order. Completion order across workers is not
/// guaranteed: execution is genuinely concurrent.
pub struct TaskPool {
    shared: Arc<PoolShared>,
    workers: Vec<Worker>,
    debug: bool,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("workers", &self.workers.len())
            .field("debug", &self.debug)
            .finish()
    }
}

impl TaskPool {
    /// Create a pool and spawn its workers.
    ///
    /// Returns an error for a zero worker count and for spawn failures.
    /// A spawn failure partway through startup never leaks threads: every
    /// already-started worker is driven to exit and joined before the
    /// error is returned.
    pub fn new(config: PoolConfig) -> PoolResult<TaskPool> {
        config.validate()?;

        let shared = Arc::new(PoolShared::new());
        let mut workers = Vec::with_capacity(config.num_workers);

        for id in 0..config.num_workers {
            // Reserve the alive slot before the thread exists, so the
            // rollback wait below cannot terminate early while this worker
            // is still starting.
            shared.register_worker();
            match Worker::spawn(
                id,
                &config.thread_name_prefix,
                shared.clone(),
                config.debug_logging,
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    let code = e.raw_os_error().unwrap_or(-1);
                    // This worker never started; give back its slot, then
                    // drive every started worker to exit.
                    shared.unregister_worker();
                    shared.begin_shutdown();
                    shared.wait_all_exited();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(PoolError::SpawnFailed(code));
                }
            }
        }

        if config.debug_logging {
            kdebug!("pool started with {} workers", workers.len());
        }

        Ok(TaskPool {
            shared,
            workers,
            debug: config.debug_logging,
        })
    }

    /// Create a pool with `n` workers and default settings.
    pub fn with_workers(n: usize) -> PoolResult<TaskPool> {
        Self::new(PoolConfig::default().num_workers(n))
    }

    /// Enqueue a task.
    ///
    /// O(1); wakes at most one idle worker. Ownership of the captured
    /// context moves into the pool and on to the executing worker. The
    /// queue is unbounded: callers that outpace the workers grow it
    /// without limit.
    pub fn push<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Task::new(job))
    }

    /// Block while any task is currently executing.
    ///
    /// Queued-but-not-yet-started tasks do not count: this answers "has
    /// everything currently executing finished". Use [`wait_done`] to also
    /// wait out the queue.
    ///
    /// [`wait_done`]: TaskPool::wait_done
    pub fn wait_idle(&self) {
        self.shared.wait_idle();
    }

    /// Block until the queue is drained and no task is executing.
    pub fn wait_done(&self) {
        self.shared.wait_done();
    }

    /// A cloneable handle for producers and task bodies.
    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            shared: self.shared.clone(),
        }
    }

    /// Number of workers the pool was created with.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Tasks currently queued (not yet started).
    pub fn queued_len(&self) -> usize {
        self.shared.queued_len()
    }

    /// Workers currently executing a task.
    pub fn executing_count(&self) -> usize {
        self.shared.executing_count()
    }

    /// Workers that have not yet exited.
    pub fn alive_count(&self) -> usize {
        self.shared.alive_count()
    }

    /// Shut the pool down: stop accepting pushes, execute everything still
    /// queued, and join every worker.
    ///
    /// Blocking. Workers keep dequeuing until the queue is empty before
    /// they are permitted to exit, so the drain is implied by waiting for
    /// them. Consumes the pool; handles that outlive it get
    /// [`PoolError::ShutDown`] from `push`.
    pub fn shutdown(mut self) -> PoolResult<()> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> PoolResult<()> {
        if self.debug {
            kdebug!(
                "shutdown: draining {} queued tasks",
                self.shared.queued_len()
            );
        }
        self.shared.begin_shutdown();
        self.shared.wait_all_exited();

        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                result = Err(PoolError::WorkerPanicked);
            }
        }
        result
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            let _ = self.shutdown_and_join();
        }
    }
}

/// Cloneable producer-side handle to a pool.
///
/// Lets task bodies and other threads push work and wait on the pool
/// without owning it. A handle may outlive its pool; pushes then fail with
/// [`PoolError::ShutDown`].
#[derive(Clone)]
pub struct PoolHandle {
    shared: Arc<PoolShared>,
}

impl PoolHandle {
    /// Enqueue a task. See [`TaskPool::push`].
    pub fn push<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Task::new(job))
    }

    /// Block while any task is currently executing.
    pub fn wait_idle(&self) {
        self.shared.wait_idle();
    }

    /// Block until the queue is drained and no task is executing.
    pub fn wait_done(&self) {
        self.shared.wait_done();
    }

    /// Tasks currently queued (not yet started).
    pub fn queued_len(&self) -> usize {
        self.shared.queued_len()
    }

    /// Workers currently executing a task.
    pub fn executing_count(&self) -> usize {
        self.shared.executing_count()
    }

    /// Workers that have not yet exited.
    pub fn alive_count(&self) -> usize {
        self.shared.alive_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Spin until `cond` holds, failing the test after five seconds.
    fn wait_for(what: &str, cond: impl Fn() -> bool) {
        let start = Instant::now();
        while !cond() {
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "timed out waiting for {}",
                what
            );
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_create_zero_workers_rejected() {
        let err = TaskPool::with_workers(0).unwrap_err();
        assert_eq!(err, PoolError::NoWorkers);
    }

    #[test]
    fn test_create_too_many_workers_rejected() {
        let err = TaskPool::with_workers(workpool_core::constants::MAX_WORKERS + 1).unwrap_err();
        assert_eq!(err, PoolError::TooManyWorkers);
    }

    #[test]
    fn test_fifo_order_single_worker() {
        // With one worker, execution order equals push order
        let pool = TaskPool::with_workers(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let o = order.clone();
            pool.push(move || o.lock().unwrap().push(i)).unwrap();
        }
        pool.wait_done();

        let recorded = order.lock().unwrap();
        assert_eq!(*recorded, (0..50).collect::<Vec<_>>());
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_completion_accounting() {
        for &workers in &[1usize, 4] {
            for &n in &[0usize, 1, 100] {
                let pool = TaskPool::with_workers(workers).unwrap();
                let counter = Arc::new(AtomicUsize::new(0));

                for _ in 0..n {
                    let c = counter.clone();
                    pool.push(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                }
                pool.wait_done();
                assert_eq!(
                    counter.load(Ordering::SeqCst),
                    n,
                    "workers={} n={}",
                    workers,
                    n
                );
                pool.shutdown().unwrap();
            }
        }
    }

    #[test]
    fn test_no_dropped_work_on_immediate_shutdown() {
        // Scenario: push 5 tasks, destroy immediately; destroy blocks until
        // all 5 have run
        let pool = TaskPool::with_workers(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let c = counter.clone();
            pool.push(move || {
                std::thread::sleep(Duration::from_millis(1));
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_concurrent_producers() {
        const PRODUCERS: usize = 4;
        const TASKS_PER_PRODUCER: usize = 250;

        let pool = TaskPool::with_workers(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let handle = pool.handle();
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..TASKS_PER_PRODUCER {
                        let c = counter.clone();
                        handle
                            .push(move || {
                                c.fetch_add(1, Ordering::SeqCst);
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        pool.wait_done();
        assert_eq!(counter.load(Ordering::SeqCst), PRODUCERS * TASKS_PER_PRODUCER);
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_liveness_under_blocking() {
        // Scenario: with two workers, a fast task completes while a
        // long-blocking task is still running
        let pool = TaskPool::with_workers(2).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let blocker_started = Arc::new(AtomicBool::new(false));
        let blocker_done = Arc::new(AtomicBool::new(false));
        let fast_done = Arc::new(AtomicBool::new(false));

        {
            let started = blocker_started.clone();
            let done = blocker_done.clone();
            pool.push(move || {
                started.store(true, Ordering::SeqCst);
                let _ = gate_rx.recv();
                done.store(true, Ordering::SeqCst);
            })
            .unwrap();
        }
        wait_for("blocker to start", || blocker_started.load(Ordering::SeqCst));

        {
            let done = fast_done.clone();
            pool.push(move || {
                done.store(true, Ordering::SeqCst);
            })
            .unwrap();
        }
        wait_for("fast task to finish", || fast_done.load(Ordering::SeqCst));
        wait_for("fast task to retire", || pool.executing_count() == 1);

        // The fast task completed while the blocker still holds its worker
        assert!(!blocker_done.load(Ordering::SeqCst));

        gate_tx.send(()).unwrap();
        pool.shutdown().unwrap();
        assert!(blocker_done.load(Ordering::SeqCst));
    }

    #[test]
    fn test_clean_shutdown_on_empty_pool() {
        for &k in &[1usize, 2, 8] {
            let pool = TaskPool::with_workers(k).unwrap();
            let start = Instant::now();
            pool.shutdown().unwrap();
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "shutdown of empty pool with {} workers took too long",
                k
            );
        }
    }

    #[test]
    fn test_wait_idle_blocks_while_executing() {
        let pool = TaskPool::with_workers(1).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let started = Arc::new(AtomicBool::new(false));

        {
            let started = started.clone();
            pool.push(move || {
                started.store(true, Ordering::SeqCst);
                let _ = gate_rx.recv();
            })
            .unwrap();
        }
        wait_for("task to start", || started.load(Ordering::SeqCst));

        let idle_returned = Arc::new(AtomicBool::new(false));
        let waiter = {
            let handle = pool.handle();
            let returned = idle_returned.clone();
            std::thread::spawn(move || {
                handle.wait_idle();
                returned.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!idle_returned.load(Ordering::SeqCst));

        gate_tx.send(()).unwrap();
        waiter.join().unwrap();
        assert!(idle_returned.load(Ordering::SeqCst));
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_push_after_shutdown() {
        let pool = TaskPool::with_workers(1).unwrap();
        let handle = pool.handle();
        pool.shutdown().unwrap();

        let err = handle.push(|| {}).unwrap_err();
        assert_eq!(err, PoolError::ShutDown);
        assert_eq!(handle.alive_count(), 0);
    }

    #[test]
    fn test_task_body_can_push() {
        // Task bodies run outside the lock, so pushing from inside a task
        // must not deadlock
        let pool = TaskPool::with_workers(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let handle = pool.handle();
            let counter = counter.clone();
            pool.push(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let c = counter.clone();
                handle
                    .push(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            })
            .unwrap();
        }

        wait_for("both tasks to run", || counter.load(Ordering::SeqCst) == 2);
        pool.wait_done();
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_counters() {
        let pool = TaskPool::with_workers(3).unwrap();
        assert_eq!(pool.worker_count(), 3);
        assert_eq!(pool.alive_count(), 3);
        assert_eq!(pool.queued_len(), 0);
        assert_eq!(pool.executing_count(), 0);

        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let started = Arc::new(AtomicBool::new(false));
        {
            let started = started.clone();
            pool.push(move || {
                started.store(true, Ordering::SeqCst);
                let _ = gate_rx.recv();
            })
            .unwrap();
        }
        wait_for("task to start", || started.load(Ordering::SeqCst));
        assert_eq!(pool.executing_count(), 1);
        assert_eq!(pool.queued_len(), 0);

        gate_tx.send(()).unwrap();
        pool.wait_done();
        assert_eq!(pool.executing_count(), 0);
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_drop_drains_like_shutdown() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = TaskPool::with_workers(2).unwrap();
            for _ in 0..20 {
                let c = counter.clone();
                pool.push(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
            // Dropped without an explicit shutdown() call
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_scenario_hundred_tasks_four_workers() {
        // create(4), push 100 counter-increment tasks, wait, counter == 100
        let pool = TaskPool::with_workers(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let c = counter.clone();
            pool.push(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait_done();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        pool.shutdown().unwrap();
    }
}
