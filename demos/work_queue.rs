//! Worker pool fed through blocking queues

use atomic_ring::{AtomicQueue, Blocking, MutexQueue};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("Work Queue Example\n");

    const NUM_WORKERS: usize = 4;
    const NUM_JOBS: usize = 20;

    // Jobs go through the lock-free queue, results through the mutex baseline;
    // the blocking wrapper treats both the same.
    let jobs = Arc::new(Blocking::new(AtomicQueue::<Option<String>>::new(128)));
    let results = Arc::new(Blocking::new(MutexQueue::<String>::new(128)));

    let jobs_tx = jobs.clone();
    let producer = thread::spawn(move || {
        for i in 0..NUM_JOBS {
            let job = format!("Job-{:02}", i);
            println!("Enqueued: {}", job);
            jobs_tx.push(Some(job));
            thread::sleep(Duration::from_millis(50));
        }
        // one stop marker per worker
        for _ in 0..NUM_WORKERS {
            jobs_tx.push(None);
        }
        println!("All jobs enqueued!");
    });

    let mut workers = vec![];
    for worker_id in 0..NUM_WORKERS {
        let jobs_rx = jobs.clone();
        let results_tx = results.clone();

        workers.push(thread::spawn(move || {
            let mut processed = 0;
            while let Some(job) = jobs_rx.pop() {
                println!("Worker {} processing: {}", worker_id, job);
                thread::sleep(Duration::from_millis(200));
                results_tx.push(format!("{} -> completed by worker {}", job, worker_id));
                processed += 1;
            }
            println!("Worker {} finished ({} jobs)", worker_id, processed);
        }));
    }

    let results_rx = results.clone();
    let collector = thread::spawn(move || {
        for _ in 0..NUM_JOBS {
            let result: String = results_rx.pop();
            println!("Result: {}", result);
        }
        println!("All results collected!");
    });

    producer.join().unwrap();
    for worker in workers {
        worker.join().unwrap();
    }
    collector.join().unwrap();

    println!("\nWork queue example completed!");
}
