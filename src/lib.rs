//! atomic_ring - bounded lock-free MPMC queue with per-slot state tags
//!
//! [`AtomicQueue`] hands out slots through two CAS-advanced counters and
//! guards each slot with a four-state tag, so no sentinel value is needed and
//! any `Send` element type works. [`Blocking`] turns any [`TryQueue`] into a
//! spin-blocking one, and [`MutexQueue`] is a lock-based backend with the same
//! contract.
#![warn(missing_docs)]

mod atomic;
pub mod backoff;
mod blocking;
mod error;
mod mutex;
pub mod trace;

pub use atomic::{AtomicQueue, MAX_CAPACITY};
pub use blocking::Blocking;
pub use error::{CapacityError, PopError, PushError};
pub use mutex::MutexQueue;

/// Non-blocking operations every backend offers.
///
/// This is the capability [`Blocking`] builds on. The `was_*` methods are
/// snapshots that a concurrent push or pop may invalidate before they return.
pub trait TryQueue<T> {
    /// Append `value`, or hand it back if the queue is full or contended.
    fn try_push(&self, value: T) -> Result<(), PushError<T>>;

    /// Remove the oldest element, or fail if the queue is empty or contended.
    fn try_pop(&self) -> Result<T, PopError>;

    /// Element count, within `0..=capacity()`.
    fn was_size(&self) -> usize;

    /// Maximum number of elements.
    fn capacity(&self) -> usize;

    /// `was_size() == 0`.
    fn was_empty(&self) -> bool {
        self.was_size() == 0
    }

    /// `was_size() >= capacity()`.
    fn was_full(&self) -> bool {
        self.was_size() >= self.capacity()
    }
}

/// Smallest power of two `>= a`.
///
/// Returns 0 when there is none: for `a == 0` and for `a > 2^63`.
pub const fn round_up_to_power_of_2(a: u64) -> u64 {
    let mut x = a.wrapping_sub(1);
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x |= x >> 32;
    x.wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round_up_to_power_of_2(0), 0);
        assert_eq!(round_up_to_power_of_2(1), 1);
        assert_eq!(round_up_to_power_of_2(2), 2);
        assert_eq!(round_up_to_power_of_2(3), 4);
        assert_eq!(round_up_to_power_of_2(1000), 1024);
        assert_eq!(round_up_to_power_of_2(1024), 1024);
        assert_eq!(round_up_to_power_of_2(1 << 63), 1 << 63);
        assert_eq!(round_up_to_power_of_2((1 << 63) + 1), 0);
    }

    #[test]
    fn rounding_is_const() {
        const CAP: u64 = round_up_to_power_of_2(100);
        assert_eq!(CAP, 128);
    }
}
