//! Millisecond clock abstraction

/// Monotonic millisecond counter
///
/// The counter is free-running and allowed to wrap; consumers must compare
/// timestamps with wrapping arithmetic.
pub trait Millis {
    /// Current time in milliseconds
    ///
    /// Takes `&mut self` because timer reads on most targets need exclusive
    /// access to the counter registers.
    fn millis(&mut self) -> u32;

    /// Milliseconds elapsed since `since`, tolerant of counter wrap
    fn elapsed_since(&mut self, since: u32) -> u32 {
        self.millis().wrapping_sub(since)
    }
}
