//! Millisecond uptime clock abstraction

/// Monotonic millisecond uptime, wrapping at `u32::MAX`.
///
/// Consumers must compare timestamps with `wrapping_sub` so that the
/// ~49-day wraparound is handled correctly.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch (typically boot).
    fn now_ms(&self) -> u32;
}
