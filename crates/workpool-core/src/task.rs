//! The unit of work submitted to a pool
//!
//! A `Task` is an opaque job: a boxed closure that owns whatever context it
//! captured. Ownership moves into the pool at push time and on to the
//! executing worker at dequeue; the closure releases its own resources when
//! it returns (or is dropped unrun, which only happens if a pool is leaked
//! mid-teardown by `std::process::exit`).

use core::fmt;

/// One unit of work: a function plus its captured context.
pub struct Task {
    job: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Wrap a closure into a task.
    pub fn new<F>(job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { job: Box::new(job) }
    }

    /// Execute the task, consuming it.
    ///
    /// Runs on the worker thread, outside the pool lock.
    pub fn run(self) {
        (self.job)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_run_consumes_and_executes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let task = Task::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        task.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_captured_context_dropped_after_run() {
        struct Probe(Arc<AtomicUsize>);
        impl Drop for Probe {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let probe = Probe(drops.clone());

        let task = Task::new(move || {
            let _keep = &probe;
        });
        task.run();

        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
