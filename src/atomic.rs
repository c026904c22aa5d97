//! Bounded lock-free MPMC queue built from two reservation counters and a
//! four-state tag per slot.
//!
//! A producer reserves a ticket by advancing `head` with a CAS, a consumer
//! by advancing `tail`. The ticket picks a slot (`ticket & mask`). The slot's
//! state tag then serializes access to its storage:
//!
//! ```text
//!   EMPTY --push CAS--> STORING --release--> STORED
//!     ^                                        |
//!     +--release-- LOADING <--pop CAS----------+
//! ```
//!
//! The winning state CAS is `Acquire` and the publishing store is `Release`,
//! so the payload handoff is ordered by the tag alone and the counters can
//! stay `Relaxed`.

#[cfg(not(loom))]
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
#[cfg(loom)]
use loom::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::{size_of, MaybeUninit};

use crossbeam_utils::CachePadded;

use crate::backoff::Backoff;
use crate::blocking::{pop_with_backoff, push_with_backoff};
use crate::error::{CapacityError, PopError, PushError};
use crate::trace::{debug, trace, warn};
use crate::{round_up_to_power_of_2, TryQueue};

const EMPTY: u8 = 0;
const STORING: u8 = 1;
const STORED: u8 = 2;
const LOADING: u8 = 3;

/// Number of state tags packed into one cache line.
#[cfg(not(loom))]
const TAGS_PER_LINE: usize = 64;
// Fewer atomics per model execution.
#[cfg(loom)]
const TAGS_PER_LINE: usize = 4;

/// Largest accepted capacity. Keeps `head - tail` meaningful as a signed
/// difference after the counters wrap.
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 2);

/// One cache line worth of slot state tags.
#[repr(C, align(64))]
struct TagLine {
    tags: [AtomicU8; TAGS_PER_LINE],
}

impl TagLine {
    fn new() -> Self {
        TagLine { tags: core::array::from_fn(|_| AtomicU8::new(EMPTY)) }
    }
}

/// Bounded lock-free multi-producer multi-consumer queue.
///
/// Capacity is fixed at construction and rounded up to a power of two.
/// No allocation happens after construction.
///
/// ```
/// use atomic_ring::AtomicQueue;
///
/// let q = AtomicQueue::new(4);
/// for i in 1..=4 {
///     assert!(q.try_push(i).is_ok());
/// }
/// assert!(q.try_push(5).is_err());
/// assert_eq!(q.pop(), 1);
/// ```
pub struct AtomicQueue<T> {
    /// Next ticket handed to a producer.
    head: CachePadded<AtomicUsize>,
    /// Next ticket handed to a consumer.
    tail: CachePadded<AtomicUsize>,
    /// Element storage, contiguous.
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Slot state tags, `TAGS_PER_LINE` to a cache-aligned line.
    states: Box<[TagLine]>,
    mask: usize,
}

unsafe impl<T: Send> Send for AtomicQueue<T> {}
unsafe impl<T: Send> Sync for AtomicQueue<T> {}

impl<T> AtomicQueue<T> {
    /// Create a queue holding at least `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, above [`MAX_CAPACITY`], or too large
    /// for the element storage to fit the address space.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a queue holding at least `capacity` elements, rejecting
    /// capacities that cannot be represented.
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            warn!("rejected zero capacity");
            return Err(CapacityError::Zero);
        }
        if capacity > MAX_CAPACITY {
            warn!(capacity, max = MAX_CAPACITY, "rejected oversized capacity");
            return Err(CapacityError::TooLarge { requested: capacity, max: MAX_CAPACITY });
        }
        // Fits: capacity <= MAX_CAPACITY, itself a power of two.
        let rounded = round_up_to_power_of_2(capacity as u64) as usize;

        let element_size = size_of::<UnsafeCell<MaybeUninit<T>>>();
        // One tag byte per slot on top of the element itself.
        let footprint = rounded.checked_mul(element_size + 1);
        if footprint.map_or(true, |bytes| bytes > isize::MAX as usize) {
            warn!(capacity = rounded, element_size, "rejected capacity beyond the address space");
            return Err(CapacityError::ExceedsAddressSpace { capacity: rounded, element_size });
        }

        let slots = (0..rounded).map(|_| UnsafeCell::new(MaybeUninit::uninit())).collect();
        let states = (0..rounded.div_ceil(TAGS_PER_LINE)).map(|_| TagLine::new()).collect();

        debug!(requested = capacity, capacity = rounded, "atomic queue created");

        Ok(AtomicQueue {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            slots,
            states,
            mask: rounded - 1,
        })
    }

    #[inline(always)]
    fn state(&self, index: usize) -> &AtomicU8 {
        &self.states[index / TAGS_PER_LINE].tags[index % TAGS_PER_LINE]
    }

    /// Try to append `value`.
    ///
    /// Fails if the queue is observed full or another producer wins the
    /// reservation; the element is handed back inside the error.
    pub fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        if occupancy(head, tail) >= self.capacity() as isize {
            return Err(PushError(value));
        }
        // Strong CAS: failing must mean another producer moved `head`.
        if self
            .head
            .compare_exchange(head, head.wrapping_add(1), Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Err(PushError(value));
        }
        // The CAS published `head + 1`; our slot is the one just behind it.
        self.store(head & self.mask, value);
        Ok(())
    }

    /// Try to remove the oldest element.
    ///
    /// Fails if the queue is observed empty or another consumer wins the
    /// reservation.
    pub fn try_pop(&self) -> Result<T, PopError> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        if occupancy(head, tail) <= 0 {
            return Err(PopError);
        }
        if self
            .tail
            .compare_exchange(tail, tail.wrapping_add(1), Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Err(PopError);
        }
        Ok(self.load(tail & self.mask))
    }

    /// Write into a reserved slot once its previous occupant has drained.
    fn store(&self, index: usize, value: T) {
        let state = self.state(index);
        let backoff = Backoff::new();
        loop {
            if state
                .compare_exchange_weak(EMPTY, STORING, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                // SAFETY: STORING grants this thread exclusive access to the slot.
                unsafe { (*self.slots[index].get()).write(value) };
                state.store(STORED, Ordering::Release);
                return;
            }
            // A consumer from the previous lap is still loading.
            while state.load(Ordering::Relaxed) != EMPTY {
                backoff.spin();
            }
        }
    }

    /// Take from a reserved slot once its producer has published.
    fn load(&self, index: usize) -> T {
        let state = self.state(index);
        let backoff = Backoff::new();
        loop {
            if state
                .compare_exchange_weak(STORED, LOADING, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                // SAFETY: LOADING grants exclusive access, and the Acquire CAS
                // observed the producer's Release store of a written value.
                let value = unsafe { (*self.slots[index].get()).assume_init_read() };
                state.store(EMPTY, Ordering::Release);
                return value;
            }
            // The producer of this ticket is still storing.
            while state.load(Ordering::Relaxed) != STORED {
                backoff.spin();
            }
        }
    }

    /// Append `value`, spinning until there is room.
    ///
    /// Never fails and has no timeout.
    pub fn push(&self, value: T) {
        push_with_backoff(self, value)
    }

    /// Remove the oldest element, spinning until one is available.
    ///
    /// Never fails and has no timeout.
    pub fn pop(&self) -> T {
        pop_with_backoff(self)
    }

    /// Snapshot: number of reserved tickets not yet claimed by a consumer.
    /// Always within `0..=capacity`, possibly stale on return.
    pub fn was_size(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        occupancy(head, tail).clamp(0, self.capacity() as isize) as usize
    }

    /// Snapshot: no elements.
    pub fn was_empty(&self) -> bool {
        self.was_size() == 0
    }

    /// Snapshot: no free slots.
    pub fn was_full(&self) -> bool {
        self.was_size() >= self.capacity()
    }

    /// Number of slots, always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

/// Signed distance between the counters. Wrapping keeps it correct across
/// counter overflow as long as the true distance fits `isize`.
#[inline(always)]
fn occupancy(head: usize, tail: usize) -> isize {
    head.wrapping_sub(tail) as isize
}

impl<T> TryQueue<T> for AtomicQueue<T> {
    #[inline]
    fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        AtomicQueue::try_push(self, value)
    }

    #[inline]
    fn try_pop(&self) -> Result<T, PopError> {
        AtomicQueue::try_pop(self)
    }

    #[inline]
    fn was_size(&self) -> usize {
        AtomicQueue::was_size(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        AtomicQueue::capacity(self)
    }
}

impl<T> fmt::Debug for AtomicQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicQueue")
            .field("capacity", &self.capacity())
            .field("was_size", &self.was_size())
            .finish()
    }
}

impl<T> Drop for AtomicQueue<T> {
    fn drop(&mut self) {
        // `&mut self` rules out in-flight STORING/LOADING; only STORED slots
        // still own a value.
        let mut remaining = 0usize;
        for index in 0..self.slots.len() {
            if self.state(index).load(Ordering::Relaxed) == STORED {
                // SAFETY: STORED means initialized and not yet read.
                unsafe { (*self.slots[index].get()).assume_init_drop() };
                remaining += 1;
            }
        }
        if remaining > 0 {
            trace!(remaining, "dropped unconsumed elements");
        }
    }
}
