//! Throughput benchmark across worker counts
//!
//! Pushes a fixed batch of counter-increment tasks through pools of
//! increasing size and prints a rate table. For statistically rigorous
//! numbers use the criterion bench in crates/workpool/benches.

use workpool::TaskPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn run_once(workers: usize, tasks: usize) -> (f64, u64) {
    let pool = TaskPool::with_workers(workers).expect("failed to create pool");
    let completed = Arc::new(AtomicU64::new(0));

    let start = Instant::now();
    for _ in 0..tasks {
        let c = completed.clone();
        pool.push(move || {
            c.fetch_add(1, Ordering::Relaxed);
        })
        .expect("push failed");
    }
    pool.wait_done();
    let elapsed = start.elapsed().as_secs_f64();
    pool.shutdown().expect("shutdown failed");

    (tasks as f64 / elapsed, completed.load(Ordering::Relaxed))
}

fn main() {
    println!("=== Workpool Throughput Benchmark ===\n");

    let tasks: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(50_000);

    println!("{} tasks per run\n", tasks);
    println!("{:>8}  {:>14}  {:>10}", "workers", "tasks/sec", "completed");

    for &workers in &[1usize, 2, 4, 8] {
        // Warm-up run, then the measured one
        let _ = run_once(workers, tasks / 10);
        let (rate, completed) = run_once(workers, tasks);
        println!("{:>8}  {:>14.0}  {:>10}", workers, rate, completed);
    }

    println!("\n=== Benchmark Complete ===");
}
