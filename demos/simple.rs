//! Simple usage example

use atomic_ring::AtomicQueue;
use std::sync::Arc;
use std::thread;

fn main() {
    atomic_ring::trace::init_tracing();
    println!("atomic_ring - Simple Example\n");

    // Create a queue with 16 slots
    let queue = Arc::new(AtomicQueue::<String>::new(16));

    let producer_queue = queue.clone();
    let consumer_queue = queue.clone();

    let producer = thread::spawn(move || {
        for i in 0..10 {
            let mut message = format!("Message {}", i);
            println!("Pushing: {}", message);

            // Queue is full or contended: take the value back and retry
            while let Err(rejected) = producer_queue.try_push(message) {
                message = rejected.into_inner();
                std::hint::spin_loop();
            }

            thread::sleep(std::time::Duration::from_millis(100));
        }
        println!("Producer finished!");
    });

    let consumer = thread::spawn(move || {
        for _ in 0..10 {
            // Blocking pop spins until a message arrives
            let message = consumer_queue.pop();
            println!("Popped: {}", message);
        }
        println!("Consumer finished!");
    });

    producer.join().unwrap();
    consumer.join().unwrap();

    println!("\nExample completed successfully!");
}
