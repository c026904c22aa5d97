//! Error types shared by every backend.

use core::fmt;

use thiserror::Error;

/// Returned by `try_push` when the queue was observed full or another
/// producer won the reservation. Carries the rejected element back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Take back the element that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushError(..)")
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full or contended")
    }
}

impl<T> std::error::Error for PushError<T> {}

/// Returned by `try_pop` when the queue was observed empty or another
/// consumer won the reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopError;

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is empty or contended")
    }
}

impl std::error::Error for PopError {}

/// Construction-time rejection of a capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// A queue must hold at least one element.
    #[error("capacity must be greater than 0")]
    Zero,
    /// The requested capacity cannot be represented with wraparound-safe counters.
    #[error("capacity {requested} exceeds the maximum of {max}")]
    TooLarge {
        /// Capacity asked for.
        requested: usize,
        /// Largest accepted capacity.
        max: usize,
    },
    /// The element storage for this capacity would not fit the address space.
    #[error("capacity {capacity} of {element_size}-byte elements exceeds the address space")]
    ExceedsAddressSpace {
        /// Capacity after rounding up to a power of two.
        capacity: usize,
        /// Size of one element slot in bytes.
        element_size: usize,
    },
}
