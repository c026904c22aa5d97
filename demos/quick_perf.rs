//! Rough throughput numbers for both backends

use atomic_ring::{AtomicQueue, Blocking, MutexQueue, TryQueue};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const MESSAGES: usize = 1_000_000;
const BUFFER_SIZE: usize = 1024;

fn main() {
    println!("atomic_ring Performance Test");
    println!("============================\n");

    for (producers, consumers) in [(1, 1), (4, 1), (1, 4), (4, 4)] {
        println!("{} Producer(s), {} Consumer(s) ({} messages):", producers, consumers, MESSAGES);

        let elapsed = run(AtomicQueue::new(BUFFER_SIZE), producers, consumers);
        report("AtomicQueue", elapsed);

        let elapsed = run(MutexQueue::new(BUFFER_SIZE), producers, consumers);
        report("MutexQueue", elapsed);
        println!();
    }
}

fn report(name: &str, elapsed: Duration) {
    let throughput = MESSAGES as f64 / elapsed.as_secs_f64();
    println!("  {:<12} Time: {:?}", name, elapsed);
    println!("  {:<12} Throughput: {:.2} msgs/sec", "", throughput);
    println!("  {:<12} Latency: {:.0} ns/op", "", elapsed.as_nanos() as f64 / MESSAGES as f64);
}

fn run<Q>(queue: Q, producers: usize, consumers: usize) -> Duration
where
    Q: TryQueue<usize> + Send + Sync + 'static,
{
    let per_producer = MESSAGES / producers;
    let per_consumer = MESSAGES / consumers;
    let queue = Arc::new(Blocking::new(queue));
    let mut handles = vec![];

    let start = Instant::now();
    for p in 0..producers {
        let q = queue.clone();
        handles.push(thread::spawn(move || {
            for i in 0..per_producer {
                q.push(p * per_producer + i);
            }
        }));
    }

    for _ in 0..consumers {
        let q = queue.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..per_consumer {
                let _: usize = q.pop();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }
    start.elapsed()
}
