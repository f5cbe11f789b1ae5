//! Stress test - many tasks
//!
//! Tests pushing and draining large numbers of tasks.

use workpool::{env_get, TaskPool, PoolConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    println!("=== Workpool Stress Test ===\n");

    let num_tasks: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);
    let num_workers: usize = env_get("WP_WORKERS", 8);

    println!("Pushing {} tasks across {} workers...", num_tasks, num_workers);

    let config = PoolConfig::default().num_workers(num_workers);
    let pool = TaskPool::new(config).expect("failed to create pool");

    let completed = Arc::new(AtomicU64::new(0));

    let start = Instant::now();

    for i in 0..num_tasks {
        let completed = completed.clone();
        pool.push(move || {
            completed.fetch_add(1, Ordering::Relaxed);
        })
        .expect("push failed");

        // Progress indicator
        if (i + 1) % 10_000 == 0 {
            print!("\rPushed: {}/{}", i + 1, num_tasks);
        }
    }

    let push_time = start.elapsed();
    println!("\n\nPush time: {:?}", push_time);
    println!(
        "Push rate: {:.0} tasks/sec",
        num_tasks as f64 / push_time.as_secs_f64()
    );

    println!("\nDraining...");
    let drain_start = Instant::now();
    pool.wait_done();
    let drain_time = drain_start.elapsed();
    let total_time = start.elapsed();

    pool.shutdown().expect("shutdown failed");

    println!("\n=== Results ===");
    println!("Total tasks:  {}", num_tasks);
    println!("Completed:    {}", completed.load(Ordering::Relaxed));
    println!("Push time:    {:?}", push_time);
    println!("Drain time:   {:?}", drain_time);
    println!("Total time:   {:?}", total_time);
    println!(
        "Throughput:   {:.0} tasks/sec",
        num_tasks as f64 / total_time.as_secs_f64()
    );

    println!("\n=== Stress Test Complete ===");
}
