//! Basic workpool example
//!
//! Demonstrates pushing tasks to a pool with multiple workers.
//!
//! # Environment Variables
//!
//! - `WP_FLUSH_EPRINT=1` - Flush debug output immediately (useful for crash debugging)
//! - `WP_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)

use workpool::{kdebug, kinfo, PoolConfig, TaskPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// WP_LOG_LEVEL=debug WP_FLUSH_EPRINT=1 cargo run -p workpool-basic
fn main() {
    println!("=== Workpool Basic Example ===\n");

    // Logging is initialized lazily from WP_FLUSH_EPRINT and WP_LOG_LEVEL,
    // or programmatically:
    // workpool::set_log_level(workpool::LogLevel::Debug);

    let config = PoolConfig::default()
        .num_workers(4)
        .debug_logging(true);

    let pool = TaskPool::new(config).expect("failed to create pool");

    // Counter to track completed tasks
    let completed = Arc::new(AtomicUsize::new(0));

    kinfo!("Pushing tasks...");

    for i in 1..=8u64 {
        let c = completed.clone();
        pool.push(move || {
            kdebug!("[task {}] started", i);

            // Do a little work
            let mut acc: u64 = 0;
            for j in 0..10_000u64 {
                acc = acc.wrapping_add(j ^ i);
            }
            std::hint::black_box(acc);

            kdebug!("[task {}] finished", i);
            c.fetch_add(1, Ordering::SeqCst);
        })
        .expect("push failed");
        println!("Pushed task {}", i);
    }

    println!("\nWaiting for 8 tasks to complete...\n");
    pool.wait_done();

    let count = completed.load(Ordering::SeqCst);
    kinfo!("{} task(s) completed", count);
    println!("Completed: {}/8", count);

    pool.shutdown().expect("shutdown failed");
    println!("\n=== Example Complete ===");
}
