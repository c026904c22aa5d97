//! Spin backoff used between failed reservation attempts.
//!
//! Outside loom this is [`crossbeam_utils::Backoff`], used only through
//! `spin()`, which never gives up the OS time slice. Under `--cfg loom` every
//! pause becomes a loom yield point so spin loops stay explorable by the model
//! checker.

#[cfg(not(loom))]
pub use crossbeam_utils::Backoff;

/// One pause hint to the executing hardware thread.
#[inline(always)]
pub fn spin_loop_pause() {
    #[cfg(loom)]
    loom::hint::spin_loop();
    #[cfg(not(loom))]
    core::hint::spin_loop();
}

/// Model-checked stand-in with the subset of the crossbeam API used here.
#[cfg(loom)]
#[derive(Debug, Default)]
pub struct Backoff;

#[cfg(loom)]
impl Backoff {
    /// Fresh backoff.
    pub const fn new() -> Self {
        Backoff
    }

    /// Single yield point.
    #[inline]
    pub fn spin(&self) {
        spin_loop_pause();
    }

    /// Nothing to reset.
    #[inline]
    pub fn reset(&self) {}

    /// Spinning never escalates.
    pub fn is_completed(&self) -> bool {
        false
    }
}
