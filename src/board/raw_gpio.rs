//! Raw GPIO input snapshot for the ESP32.
//!
//! The input levels of all pads live in two registers: GPIO0-31 in
//! `GPIO_IN_REG` and GPIO32-39 in `GPIO_IN1_REG`. esp-hal exposes inputs
//! one pin at a time, which would let a decision mix samples taken at
//! different moments, so both banks are read straight from the
//! registers here.
//!
//! The two loads are not one bus access; `read_banks` pairs them up so
//! both halves come from one window in which the high bank was stable.

use crate::drivers::input::{Bank, InputSource, RawInputs, read_banks};

const GPIO_IN_REG: u32 = 0x3FF4_403C; // GPIO0-31 input levels
const GPIO_IN1_REG: u32 = 0x3FF4_4040; // GPIO32-39 input levels, bits [7:0]
const IN1_MASK: u32 = 0xFF;
const MAX_RETRIES: u32 = 4;

/// Both input banks as one 64-bit snapshot.
pub struct GpioSnapshot {
    _private: (),
}

impl GpioSnapshot {
    // Safety: caller must ensure the pins of interest are configured as
    // inputs (esp-hal `Input`s) for as long as this exists. Reading the
    // input registers has no side effects.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn load(reg: u32) -> u32 {
        unsafe { (reg as *const u32).read_volatile() }
    }
}

impl InputSource for GpioSnapshot {
    fn read(&mut self) -> RawInputs {
        read_banks(
            |bank| match bank {
                Bank::Low => Self::load(GPIO_IN_REG),
                Bank::High => Self::load(GPIO_IN1_REG) & IN1_MASK,
            },
            MAX_RETRIES,
        )
    }
}
