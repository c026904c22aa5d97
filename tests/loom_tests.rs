//! Run with
//! `RUSTFLAGS="--cfg loom" LOOM_MAX_PREEMPTIONS=3 cargo test --test loom_tests --release`.
#![cfg(loom)]

use atomic_ring::{AtomicQueue, Blocking};
use loom::sync::Arc;
use loom::thread;

#[test]
fn loom_spsc_fifo() {
    loom::model(|| {
        let queue = Arc::new(AtomicQueue::<i32>::new(2));
        let q_push = queue.clone();
        let q_pop = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..3 {
                while q_push.try_push(i).is_err() {
                    thread::yield_now();
                }
            }
        });

        let consumer = thread::spawn(move || {
            let mut received = vec![];
            while received.len() < 3 {
                match q_pop.try_pop() {
                    Ok(val) => received.push(val),
                    Err(_) => thread::yield_now(),
                }
            }
            received
        });

        producer.join().unwrap();
        assert_eq!(consumer.join().unwrap(), vec![0, 1, 2]);
    });
}

#[test]
fn loom_mpsc() {
    loom::model(|| {
        let queue = Arc::new(AtomicQueue::<i32>::new(4));
        let mut handles = vec![];

        for i in 0..2 {
            let q = queue.clone();
            handles.push(thread::spawn(move || {
                while q.try_push(i).is_err() {
                    thread::yield_now();
                }
            }));
        }

        let mut received = vec![];
        while received.len() < 2 {
            match queue.try_pop() {
                Ok(val) => received.push(val),
                Err(_) => thread::yield_now(),
            }
        }

        for h in handles {
            h.join().unwrap();
        }
        received.sort();
        assert_eq!(received, vec![0, 1]);
    });
}

#[test]
fn loom_mpmc_exactly_once() {
    loom::model(|| {
        let queue = Arc::new(AtomicQueue::<i32>::new(2));
        let mut consumers = vec![];

        let q = queue.clone();
        let producer = thread::spawn(move || {
            while q.try_push(10).is_err() {
                thread::yield_now();
            }
        });

        for _ in 0..2 {
            let q = queue.clone();
            consumers.push(thread::spawn(move || q.try_pop().ok()));
        }

        while queue.try_push(20).is_err() {
            thread::yield_now();
        }
        producer.join().unwrap();

        let mut got: Vec<i32> = consumers.into_iter().filter_map(|h| h.join().unwrap()).collect();
        while let Ok(v) = queue.try_pop() {
            got.push(v);
        }
        got.sort();
        assert_eq!(got, vec![10, 20]);
    });
}

#[test]
fn loom_wraparound_waits_for_slot() {
    // capacity 1: every push lands on the slot the previous pop is draining
    loom::model(|| {
        let queue = Arc::new(AtomicQueue::<usize>::new(1));
        queue.push(1);

        let q = queue.clone();
        let consumer = thread::spawn(move || q.pop() + q.pop());

        queue.push(2);
        assert_eq!(consumer.join().unwrap(), 3);
        assert!(queue.was_empty());
    });
}

#[test]
fn loom_full_queue() {
    loom::model(|| {
        let queue = Arc::new(AtomicQueue::<i32>::new(1));
        let q1 = queue.clone();
        let q2 = queue.clone();

        let t1 = thread::spawn(move || q1.try_push(1).is_ok());
        let t2 = thread::spawn(move || q2.try_push(2).is_ok());

        let pushed = [t1.join().unwrap(), t2.join().unwrap()];
        let pushed = pushed.iter().filter(|ok| **ok).count();

        let mut count = 0;
        while queue.try_pop().is_ok() {
            count += 1;
        }
        // exactly one producer gets the single slot
        assert_eq!(pushed, 1);
        assert_eq!(count, 1);
    });
}

#[test]
fn loom_blocking_decorator() {
    loom::model(|| {
        let queue = Arc::new(Blocking::new(AtomicQueue::<i32>::new(1)));
        let q = queue.clone();

        let producer = thread::spawn(move || {
            q.push(1);
            q.push(2);
        });

        assert_eq!(queue.pop(), 1);
        assert_eq!(queue.pop(), 2);
        producer.join().unwrap();
    });
}
