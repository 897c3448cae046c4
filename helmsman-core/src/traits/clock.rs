//! Millisecond time source

/// Monotonic millisecond clock
///
/// The value wraps at `u32::MAX`; every consumer compares times with
/// `wrapping_sub`, which stays correct across the wrap as long as the
/// compared instants are less than ~49 days apart.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `since_ms`
    fn elapsed_ms(&self, since_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(since_ms)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
