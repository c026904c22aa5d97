//! Lock-guarded bounded queue with the same contract as [`AtomicQueue`].
//!
//! Serves as a baseline in benchmarks and as a drop-in for callers that would
//! rather pay for a lock than reason about lock-free progress.
//!
//! [`AtomicQueue`]: crate::AtomicQueue

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::blocking::{pop_with_backoff, push_with_backoff};
use crate::error::{CapacityError, PopError, PushError};
use crate::trace::{debug, warn};
use crate::TryQueue;

/// Bounded FIFO behind a single [`parking_lot::Mutex`].
///
/// Unlike [`AtomicQueue`](crate::AtomicQueue) the capacity is exact, not
/// rounded, and the `was_*` snapshots are taken under the lock.
pub struct MutexQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> MutexQueue<T> {
    /// Create a queue holding exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a queue holding exactly `capacity` elements.
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            warn!("rejected zero capacity");
            return Err(CapacityError::Zero);
        }
        debug!(capacity, "mutex queue created");
        Ok(MutexQueue { items: Mutex::new(VecDeque::with_capacity(capacity)), capacity })
    }

    /// Append `value` unless the queue is full.
    pub fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return Err(PushError(value));
        }
        items.push_back(value);
        Ok(())
    }

    /// Remove the oldest element unless the queue is empty.
    pub fn try_pop(&self) -> Result<T, PopError> {
        self.items.lock().pop_front().ok_or(PopError)
    }

    /// Append `value`, spinning until there is room.
    pub fn push(&self, value: T) {
        push_with_backoff(self, value)
    }

    /// Remove the oldest element, spinning until one is available.
    pub fn pop(&self) -> T {
        pop_with_backoff(self)
    }

    /// Snapshot of the element count.
    pub fn was_size(&self) -> usize {
        self.items.lock().len()
    }

    /// Snapshot: no elements.
    pub fn was_empty(&self) -> bool {
        self.was_size() == 0
    }

    /// Snapshot: no free slots.
    pub fn was_full(&self) -> bool {
        self.was_size() >= self.capacity
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> TryQueue<T> for MutexQueue<T> {
    fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        MutexQueue::try_push(self, value)
    }

    fn try_pop(&self) -> Result<T, PopError> {
        MutexQueue::try_pop(self)
    }

    fn was_size(&self) -> usize {
        MutexQueue::was_size(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for MutexQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutexQueue")
            .field("capacity", &self.capacity)
            .field("was_size", &self.was_size())
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn exact_capacity() {
        let q = MutexQueue::new(3);
        assert_eq!(q.capacity(), 3);
        for i in 0..3 {
            q.push(i);
        }
        assert!(q.was_full());
        assert_eq!(q.try_push(3), Err(PushError(3)));
        assert_eq!(q.pop(), 0);
        assert_eq!(q.was_size(), 2);
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(MutexQueue::<u8>::try_new(0).unwrap_err(), CapacityError::Zero);
    }
}
