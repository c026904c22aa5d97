//! Spin-blocking push/pop over any [`TryQueue`].

use crate::backoff::Backoff;
use crate::error::{PopError, PushError};
use crate::TryQueue;

/// Retry `try_push` until it succeeds, pausing between attempts.
pub(crate) fn push_with_backoff<T, Q>(queue: &Q, mut value: T)
where
    Q: TryQueue<T> + ?Sized,
{
    let backoff = Backoff::new();
    loop {
        match queue.try_push(value) {
            Ok(()) => return,
            Err(PushError(rejected)) => {
                value = rejected;
                backoff.spin();
            }
        }
    }
}

/// Retry `try_pop` until it succeeds, pausing between attempts.
pub(crate) fn pop_with_backoff<T, Q>(queue: &Q) -> T
where
    Q: TryQueue<T> + ?Sized,
{
    let backoff = Backoff::new();
    loop {
        match queue.try_pop() {
            Ok(value) => return value,
            Err(PopError) => backoff.spin(),
        }
    }
}

/// Adds blocking `push`/`pop` to a queue that only offers `try_` operations.
///
/// The wrapper holds no state of its own: both blocking calls are loops over
/// the backend's `try_push`/`try_pop` with a [`Backoff`] pause in between.
/// Neither call has a timeout. A caller that needs a deadline should loop
/// over the `try_` methods itself.
///
/// ```
/// use atomic_ring::{AtomicQueue, Blocking, MutexQueue};
///
/// let lock_free = Blocking::new(AtomicQueue::<u32>::new(8));
/// lock_free.push(7);
/// assert_eq!(lock_free.pop(), 7);
///
/// let locked = Blocking::new(MutexQueue::<u32>::new(8));
/// locked.push(7);
/// assert_eq!(locked.pop(), 7);
/// ```
#[derive(Debug, Default)]
pub struct Blocking<Q> {
    inner: Q,
}

impl<Q> Blocking<Q> {
    /// Wrap `inner`.
    pub const fn new(inner: Q) -> Self {
        Blocking { inner }
    }

    /// Borrow the wrapped backend.
    pub fn get_ref(&self) -> &Q {
        &self.inner
    }

    /// Unwrap and return the backend.
    pub fn into_inner(self) -> Q {
        self.inner
    }

    /// Push `value`, spinning while the backend rejects it.
    pub fn push<T>(&self, value: T)
    where
        Q: TryQueue<T>,
    {
        push_with_backoff(&self.inner, value)
    }

    /// Pop a value, spinning while the backend has none to give.
    pub fn pop<T>(&self) -> T
    where
        Q: TryQueue<T>,
    {
        pop_with_backoff(&self.inner)
    }
}

impl<T, Q: TryQueue<T>> TryQueue<T> for Blocking<Q> {
    #[inline]
    fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        self.inner.try_push(value)
    }

    #[inline]
    fn try_pop(&self) -> Result<T, PopError> {
        self.inner.try_pop()
    }

    #[inline]
    fn was_size(&self) -> usize {
        self.inner.was_size()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Rejects every other call so the retry path is always taken.
    struct Flaky {
        items: RefCell<VecDeque<u32>>,
        calls: Cell<usize>,
    }

    impl Flaky {
        fn new() -> Self {
            Flaky { items: RefCell::new(VecDeque::new()), calls: Cell::new(0) }
        }

        fn refuse(&self) -> bool {
            let n = self.calls.get();
            self.calls.set(n + 1);
            n % 2 == 0
        }
    }

    impl TryQueue<u32> for Flaky {
        fn try_push(&self, value: u32) -> Result<(), PushError<u32>> {
            if self.refuse() {
                return Err(PushError(value));
            }
            self.items.borrow_mut().push_back(value);
            Ok(())
        }

        fn try_pop(&self) -> Result<u32, PopError> {
            if self.refuse() {
                return Err(PopError);
            }
            self.items.borrow_mut().pop_front().ok_or(PopError)
        }

        fn was_size(&self) -> usize {
            self.items.borrow().len()
        }

        fn capacity(&self) -> usize {
            usize::MAX
        }
    }

    #[test]
    fn retries_until_backend_accepts() {
        let q = Blocking::new(Flaky::new());
        q.push(1);
        q.push(2);
        assert_eq!(q.was_size(), 2);
        assert_eq!(q.pop(), 1);
        assert_eq!(q.pop(), 2);
        // one refusal plus one success per call
        assert_eq!(q.get_ref().calls.get(), 8);
    }

    #[test]
    fn delegates_contract() {
        let q = Blocking::new(Flaky::new());
        assert!(q.was_empty());
        assert!(!q.was_full());
        assert_eq!(q.capacity(), usize::MAX);
        assert_eq!(q.try_push(5), Err(PushError(5)));
        assert_eq!(q.try_push(5), Ok(()));
        assert_eq!(q.into_inner().items.into_inner(), VecDeque::from([5]));
    }
}
