//! Raw input snapshot and button decoding
//!
//! Every monitored digital line is sampled into one 64-bit word per poll.
//! Nothing downstream reads a pin directly: the button decoder, the power
//! tracker and the charge decoder all work off the same snapshot, so a
//! single decision never mixes two instants.
//!
//! Which bit carries which line, and at which level it counts as
//! active, is described by a [`PinMap`]. The board module owns the map
//! for the actual hardware revision.

use core::fmt;

use embedded_hal::digital::PinState;

use super::button::{Button, ButtonMask};

/// One atomic read of all input banks. Bit `n` is GPIO `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInputs(pub u64);

impl RawInputs {
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_high(self, bit: u8) -> bool {
        bit < 64 && (self.0 >> bit) & 1 == 1
    }

    #[inline]
    pub const fn is_active(self, line: Line) -> bool {
        match line.active {
            PinState::High => self.is_high(line.bit),
            PinState::Low => !self.is_high(line.bit),
        }
    }

    /// Copy with `line` forced to its active (or inactive) level.
    pub const fn with_line(self, line: Line, active: bool) -> Self {
        let high = match line.active {
            PinState::High => active,
            PinState::Low => !active,
        };
        let mask = 1u64 << line.bit;
        if high {
            RawInputs(self.0 | mask)
        } else {
            RawInputs(self.0 & !mask)
        }
    }
}

impl fmt::Display for RawInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#012x}", self.0)
    }
}

/// Anything that can produce a snapshot of the input banks.
///
/// Reads never fail. An implementation that cannot reach the hardware
/// returns [`PinMap::released`], which decodes as "nothing pressed,
/// no charger".
pub trait InputSource {
    fn read(&mut self) -> RawInputs;
}

impl<F> InputSource for F
where
    F: FnMut() -> RawInputs,
{
    fn read(&mut self) -> RawInputs {
        self()
    }
}

/// Half of the input register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// Bits 0-31.
    Low,
    /// Bits 32-63.
    High,
}

/// Combine two 32-bit input banks into one snapshot without tearing.
///
/// The two loads are separate bus accesses. The high bank is loaded on
/// both sides of the low bank and the pair reloaded if it moved, up to
/// `retries` times. After that the last pair is returned as is.
pub fn read_banks<F>(mut load: F, retries: u32) -> RawInputs
where
    F: FnMut(Bank) -> u32,
{
    let mut high = load(Bank::High);
    let mut low = load(Bank::Low);
    for _ in 0..retries {
        let again = load(Bank::High);
        if again == high {
            break;
        }
        high = again;
        low = load(Bank::Low);
    }
    RawInputs(((high as u64) << 32) | low as u64)
}

/// A single monitored line: its bit in the snapshot and its active level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub bit: u8,
    pub active: PinState,
}

impl Line {
    pub const fn active_low(bit: u8) -> Self {
        Self {
            bit,
            active: PinState::Low,
        }
    }

    pub const fn active_high(bit: u8) -> Self {
        Self {
            bit,
            active: PinState::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMapError {
    /// A line refers to a bit outside the 64-bit snapshot.
    OutOfRange(u8),
    /// Two buttons share one physical bit.
    Shared(u8),
    /// A wake line (power, charger-present) is active-low. The sleep
    /// controller can only OR lines together on a high level.
    WakeActiveLow(u8),
}

impl fmt::Display for PinMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinMapError::OutOfRange(bit) => write!(f, "line bit {} outside snapshot", bit),
            PinMapError::Shared(bit) => write!(f, "bit {} mapped to more than one button", bit),
            PinMapError::WakeActiveLow(bit) => {
                write!(f, "wake line on bit {} must be active-high", bit)
            }
        }
    }
}

impl core::error::Error for PinMapError {}

/// Bit assignment of every monitored input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// Indexed by `Button::index()`.
    pub buttons: [Line; Button::COUNT],
    pub power: Line,
    pub charger_present: Line,
    pub charging: Line,
}

impl PinMap {
    #[inline]
    pub const fn button(&self, button: Button) -> Line {
        self.buttons[button.index()]
    }

    /// Every bit in range and every button on its own bit.
    pub fn check(&self) -> Result<(), PinMapError> {
        let lines = self
            .buttons
            .iter()
            .chain([&self.power, &self.charger_present, &self.charging]);
        for line in lines {
            if line.bit >= 64 {
                return Err(PinMapError::OutOfRange(line.bit));
            }
        }

        let mut seen = 0u64;
        for line in self.buttons.iter().chain([&self.power]) {
            let mask = 1u64 << line.bit;
            if seen & mask != 0 {
                return Err(PinMapError::Shared(line.bit));
            }
            seen |= mask;
        }
        self.check_wake_lines()
    }

    /// Power and charger-present both have to go high when active.
    pub fn check_wake_lines(&self) -> Result<(), PinMapError> {
        for line in [self.power, self.charger_present] {
            if line.active == PinState::Low {
                return Err(PinMapError::WakeActiveLow(line.bit));
            }
        }
        Ok(())
    }

    /// Snapshot with every line at its inactive level.
    pub const fn released(&self) -> RawInputs {
        let mut raw = RawInputs(0);
        let mut i = 0;
        while i < Button::COUNT {
            raw = raw.with_line(self.buttons[i], false);
            i += 1;
        }
        raw = raw.with_line(self.power, false);
        raw = raw.with_line(self.charger_present, false);
        raw.with_line(self.charging, false)
    }

    /// Bits of all lines this map knows about.
    pub fn monitored(&self) -> u64 {
        self.buttons
            .iter()
            .chain([&self.power, &self.charger_present, &self.charging])
            .fold(0u64, |acc, line| acc | 1u64 << line.bit)
    }
}

/// Remap a snapshot into the pad mask. Pure; the power bit is never set
/// here (see `drivers::power::PowerTracker`).
pub fn decode_buttons(raw: RawInputs, pins: &PinMap) -> ButtonMask {
    let mut mask = ButtonMask::NONE;
    for button in Button::ALL {
        if raw.is_active(pins.button(button)) {
            mask |= button.mask();
        }
    }
    mask
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use proptest::prelude::*;
    use std::vec::Vec;

    /// Rev-1 style layout, active-low pad and active-high power/charger.
    pub(crate) const PINS: PinMap = PinMap {
        buttons: [
            Line::active_low(21), // Right
            Line::active_low(39), // Left
            Line::active_low(34), // Up
            Line::active_low(35), // Down
            Line::active_low(16), // A
            Line::active_low(4),  // B
            Line::active_low(25), // Select
            Line::active_low(27), // Start
        ],
        power: Line::active_high(32),
        charger_present: Line::active_high(36),
        charging: Line::active_low(19),
    };

    #[test]
    fn released_snapshot_decodes_to_nothing() {
        let raw = PINS.released();
        assert!(decode_buttons(raw, &PINS).is_empty());
        assert!(!raw.is_active(PINS.power));
        assert!(!raw.is_active(PINS.charger_present));
    }

    #[test]
    fn only_a_pulled_low() {
        // all pad lines high except A
        let raw = PINS.released().with_line(PINS.button(Button::A), true);
        assert!(!raw.is_high(16));
        assert_eq!(decode_buttons(raw, &PINS), Button::A.mask());
    }

    #[test]
    fn all_zero_reads_as_everything_pressed() {
        let mask = decode_buttons(RawInputs(0), &PINS);
        assert_eq!(mask.bits(), 0xFF);
        assert!(!mask.power_held());
    }

    #[test]
    fn check_accepts_board_map() {
        assert_eq!(PINS.check(), Ok(()));
    }

    #[test]
    fn check_rejects_shared_bit() {
        let mut pins = PINS;
        pins.buttons[Button::B.index()] = Line::active_low(16);
        assert_eq!(pins.check(), Err(PinMapError::Shared(16)));
    }

    #[test]
    fn check_rejects_out_of_range() {
        let mut pins = PINS;
        pins.charging = Line::active_low(64);
        assert_eq!(pins.check(), Err(PinMapError::OutOfRange(64)));
    }

    #[test]
    fn check_rejects_active_low_wake_lines() {
        let mut pins = PINS;
        pins.power = Line::active_low(32);
        assert_eq!(pins.check(), Err(PinMapError::WakeActiveLow(32)));

        let mut pins = PINS;
        pins.charger_present = Line::active_low(36);
        assert_eq!(pins.check_wake_lines(), Err(PinMapError::WakeActiveLow(36)));
    }

    #[test]
    fn stable_banks_read_once_each_plus_confirm() {
        let mut loads = Vec::new();
        let raw = read_banks(
            |bank| {
                loads.push(bank);
                match bank {
                    Bank::Low => 0x0000_00F0,
                    Bank::High => 0x0000_0011,
                }
            },
            4,
        );
        assert_eq!(raw, RawInputs(0x0000_0011_0000_00F0));
        assert_eq!(loads, [Bank::High, Bank::Low, Bank::High]);
    }

    #[test]
    fn moving_high_bank_rereads_low_bank() {
        // high bank changes once between the first two loads
        let highs = [0x01, 0x03, 0x03];
        let lows = [0xAAAA_0000, 0xBBBB_0000];
        let (mut h, mut l) = (0, 0);
        let raw = read_banks(
            |bank| match bank {
                Bank::High => {
                    h += 1;
                    highs[h - 1]
                }
                Bank::Low => {
                    l += 1;
                    lows[l - 1]
                }
            },
            4,
        );
        assert_eq!(raw, RawInputs(0x0000_0003_BBBB_0000));
        assert_eq!((h, l), (3, 2));
    }

    #[test]
    fn retries_are_bounded() {
        let mut n = 0u32;
        let mut high_loads = 0;
        let raw = read_banks(
            |bank| match bank {
                Bank::High => {
                    high_loads += 1;
                    n += 1;
                    n
                }
                Bank::Low => 0,
            },
            4,
        );
        assert_eq!(high_loads, 5);
        assert_eq!(raw, RawInputs(5u64 << 32));
    }

    #[test]
    fn monitored_covers_every_line() {
        let bits = PINS.monitored();
        assert_eq!(bits.count_ones(), 11);
        assert!(bits & (1 << 32) != 0);
        assert!(bits & (1 << 19) != 0);
    }

    #[test]
    fn closure_is_an_input_source() {
        let mut n = 0u64;
        let mut src = || {
            n += 1;
            RawInputs(n)
        };
        assert_eq!(src.read(), RawInputs(1));
        assert_eq!(src.read(), RawInputs(2));
    }

    proptest! {
        #[test]
        fn each_button_is_the_negation_of_its_line(bits in any::<u64>()) {
            let raw = RawInputs(bits);
            let mask = decode_buttons(raw, &PINS);
            for button in Button::ALL {
                let line = PINS.button(button);
                prop_assert_eq!(mask.is_pressed(button), !raw.is_high(line.bit));
            }
            prop_assert!(!mask.power_held());
        }

        #[test]
        fn flipping_one_line_flips_one_button(bits in any::<u64>(), idx in 0usize..Button::COUNT) {
            let button = Button::ALL[idx];
            let raw = RawInputs(bits);
            let flipped = RawInputs(bits ^ (1u64 << PINS.button(button).bit));
            let diff = decode_buttons(raw, &PINS).bits() ^ decode_buttons(flipped, &PINS).bits();
            prop_assert_eq!(diff, button.mask().bits());
        }

        #[test]
        fn unmonitored_bits_are_ignored(bits in any::<u64>(), noise in any::<u64>()) {
            let noise = noise & !PINS.monitored();
            prop_assert_eq!(
                decode_buttons(RawInputs(bits), &PINS),
                decode_buttons(RawInputs(bits ^ noise), &PINS)
            );
        }
    }
}
