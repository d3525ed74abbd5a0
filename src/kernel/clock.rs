// Monotonic millisecond ticks
//
// The counter is 32 bits wide and wraps after ~49 days of uptime.
// Every duration is taken with wrapping subtraction, so comparisons
// stay correct across the wrap as long as the measured span itself
// is shorter than the full counter range.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick(pub u32);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Tick(ms)
    }

    /// Milliseconds from `earlier` to `self`, wrap-safe.
    #[inline]
    pub const fn elapsed_since(self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    #[inline]
    pub const fn wrapping_add(self, ms: u32) -> Tick {
        Tick(self.0.wrapping_add(ms))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of monotonic time for the polling task.
pub trait Clock {
    fn now(&self) -> Tick;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_plain_difference() {
        assert_eq!(Tick(1500).elapsed_since(Tick(500)), 1000);
        assert_eq!(Tick(7).elapsed_since(Tick(7)), 0);
    }

    #[test]
    fn elapsed_survives_counter_wrap() {
        let before = Tick(u32::MAX - 99);
        let after = before.wrapping_add(250);
        assert_eq!(after, Tick(150));
        assert_eq!(after.elapsed_since(before), 250);
    }
}
