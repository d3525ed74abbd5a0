//! Logical buttons and the per-frame button mask
//!
//! The emulator core consumes buttons as a narrow bitmask, one bit per
//! pad button, plus a synthetic bit that is set while the power button
//! is held (after boot suppression, see `drivers::power`).

use core::fmt;

/// All pad buttons on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const COUNT: usize = 8;

    pub const ALL: [Button; Button::COUNT] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Button::Right => "Right",
            Button::Left => "Left",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::A => "A",
            Button::B => "B",
            Button::Select => "Select",
            Button::Start => "Start",
        }
    }

    /// Bit this button occupies in a `ButtonMask`. Matches the pad
    /// layout the emulator core expects.
    pub const fn mask(self) -> ButtonMask {
        ButtonMask(1 << self as u16)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(u16);

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask(0);

    /// Synthetic "power held" bit, above the eight pad bits.
    pub const POWER: ButtonMask = ButtonMask(0x100);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: ButtonMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_pressed(self, button: Button) -> bool {
        self.contains(button.mask())
    }

    pub const fn power_held(self) -> bool {
        self.contains(Self::POWER)
    }

    pub fn pressed(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |&b| self.is_pressed(b))
    }
}

impl core::ops::BitOr for ButtonMask {
    type Output = ButtonMask;

    fn bitor(self, rhs: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for ButtonMask {
    fn bitor_assign(&mut self, rhs: ButtonMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ButtonMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for b in self.pressed() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(b.name())?;
            first = false;
        }
        if self.power_held() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str("Power")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_bits_follow_emulator_layout() {
        assert_eq!(Button::Right.mask().bits(), 0x01);
        assert_eq!(Button::Left.mask().bits(), 0x02);
        assert_eq!(Button::Up.mask().bits(), 0x04);
        assert_eq!(Button::Down.mask().bits(), 0x08);
        assert_eq!(Button::A.mask().bits(), 0x10);
        assert_eq!(Button::B.mask().bits(), 0x20);
        assert_eq!(Button::Select.mask().bits(), 0x40);
        assert_eq!(Button::Start.mask().bits(), 0x80);
    }

    #[test]
    fn power_bit_does_not_overlap_pad() {
        for b in Button::ALL {
            assert_eq!(b.mask().bits() & ButtonMask::POWER.bits(), 0);
        }
    }

    #[test]
    fn pressed_iterates_set_bits_only() {
        let mask = Button::A.mask() | Button::Start.mask();
        let mut it = mask.pressed();
        assert_eq!(it.next(), Some(Button::A));
        assert_eq!(it.next(), Some(Button::Start));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn empty_mask_contains_nothing() {
        assert!(!ButtonMask::NONE.contains(ButtonMask::NONE));
        assert!(!ButtonMask::NONE.is_pressed(Button::B));
    }
}
