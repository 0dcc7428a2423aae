//! Stepping millisecond clock

use twowire_hal::Millis;

/// Clock that advances by a fixed step every time it is read
///
/// A step of 0 gives a frozen clock that only moves through
/// [`advance`](Self::advance).
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: u32,
    step_ms: u32,
    reads: u32,
}

impl SimClock {
    /// Create a clock starting at 0 that advances `step_ms` per read
    pub fn new(step_ms: u32) -> Self {
        Self {
            now_ms: 0,
            step_ms,
            reads: 0,
        }
    }

    /// Create a clock starting at `start_ms`
    ///
    /// Useful to exercise counter wrap-around.
    pub fn starting_at(start_ms: u32, step_ms: u32) -> Self {
        Self {
            now_ms: start_ms,
            step_ms,
            reads: 0,
        }
    }

    /// Current time without advancing
    pub fn now(&self) -> u32 {
        self.now_ms
    }

    /// Move time forward
    pub fn advance(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }

    /// Number of times the clock was read
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl Millis for SimClock {
    fn millis(&mut self) -> u32 {
        let now = self.now_ms;
        self.now_ms = self.now_ms.wrapping_add(self.step_ms);
        self.reads += 1;
        now
    }
}
