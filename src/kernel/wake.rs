// Sleep entry and wake sources
//
// Deep sleep is one-way from this firmware's point of view: the only
// way out is a wake event, which restarts the chip from boot. Wake is
// armed on the power button OR a charger plug/unplug transition, both
// routed to RTC-capable pins and combined as "any selected line high".
//
// Retention of the RTC fast memory is dropped for sleep; nothing in it
// survives a boot anyway, and keeping it powered costs sleep current.

use core::fmt;

use crate::drivers::input::{Line, PinMap, PinMapError};

/// Which lines wake the device and what stays powered while asleep.
/// Any selected line going high wakes the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeConfig {
    /// Bit `n` selects GPIO `n`, same layout as `RawInputs`.
    pub mask: u64,
    pub retain_fast_mem: bool,
}

impl WakeConfig {
    /// Power button or charger-present, whichever goes high first.
    ///
    /// The "any line" combination only exists for the high level, so
    /// an active-low wake line is refused rather than armed on its
    /// idle level.
    pub fn from_pins(pins: &PinMap) -> Result<Self, PinMapError> {
        pins.check_wake_lines()?;
        Ok(Self {
            mask: line_bit(pins.power) | line_bit(pins.charger_present),
            retain_fast_mem: false,
        })
    }

    pub const fn wakes_on(&self, bit: u8) -> bool {
        bit < 64 && self.mask & (1 << bit) != 0
    }
}

impl fmt::Display for WakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mask={:#012x} any-high", self.mask)?;
        if !self.retain_fast_mem {
            f.write_str(" fast-mem=off")?;
        }
        Ok(())
    }
}

const fn line_bit(line: Line) -> u64 {
    1u64 << line.bit
}

/// The chip's sleep controller.
pub trait SleepControl {
    /// Arm the wake sources and memory power domains for the next sleep.
    fn arm(&mut self, config: &WakeConfig);

    /// Enter sleep. Returns only if the hardware failed to suspend.
    fn enter(&mut self);
}

impl<T: SleepControl + ?Sized> SleepControl for &mut T {
    fn arm(&mut self, config: &WakeConfig) {
        (**self).arm(config)
    }

    fn enter(&mut self) {
        (**self).enter()
    }
}
