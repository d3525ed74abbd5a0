// Display and auxiliary power rails
//
// The OLED panel has two supplies: a 3.3V logic rail for the controller
// and a high-voltage drive rail for the pixels. The drive rail must never
// be on while the logic rail is off, or the controller sits in an
// undefined state with the panel energized. Power-up therefore brings
// logic up first and drive last; power-down does the reverse.
//
// Rail switches are assumed idempotent and immediate. There is no
// feedback, so every step is followed by a fixed settle delay.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rail {
    /// 3.3V logic supply of the display controller.
    DisplayLogic,
    /// High-voltage pixel drive supply.
    DisplayDrive,
    /// Everything else that can be switched off for sleep.
    Auxiliary,
}

impl Rail {
    pub const fn name(self) -> &'static str {
        match self {
            Rail::DisplayLogic => "display 3v3",
            Rail::DisplayDrive => "display HV",
            Rail::Auxiliary => "aux",
        }
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait RailControl {
    fn set(&mut self, rail: Rail, on: bool);
}

impl<T: RailControl + ?Sized> RailControl for &mut T {
    fn set(&mut self, rail: Rail, on: bool) {
        (**self).set(rail, on)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpTiming {
    pub discharge_ms: u32,
    pub logic_settle_ms: u32,
    pub reset_pulse_ms: u32,
    pub drive_settle_ms: u32,
}

impl Default for PowerUpTiming {
    fn default() -> Self {
        Self {
            discharge_ms: 300,
            logic_settle_ms: 30,
            reset_pulse_ms: 10,
            drive_settle_ms: 300,
        }
    }
}

/// Cold-start the display: both rails off long enough for the panel to
/// discharge, logic on, reset pulse, then the drive rail.
pub fn power_up<R, RST, D>(rails: &mut R, rst: &mut RST, delay: &mut D, timing: &PowerUpTiming)
where
    R: RailControl,
    RST: OutputPin,
    D: DelayNs,
{
    rails.set(Rail::DisplayDrive, false);
    rails.set(Rail::DisplayLogic, false);
    let _ = rst.set_low();
    debug!("display: rails off, discharging {}ms", timing.discharge_ms);
    delay.delay_ms(timing.discharge_ms);

    rails.set(Rail::DisplayLogic, true);
    let _ = rst.set_high();
    delay.delay_ms(timing.logic_settle_ms);

    debug!("display: logic up, reset pulse");
    let _ = rst.set_low();
    delay.delay_ms(timing.reset_pulse_ms);
    let _ = rst.set_high();
    delay.delay_ms(timing.reset_pulse_ms);

    rails.set(Rail::DisplayDrive, true);
    rails.set(Rail::Auxiliary, true);
    delay.delay_ms(timing.drive_settle_ms);
    info!("display: rails up");
}

/// Drop every rail, drive first so the panel is never left energized
/// without its logic supply.
pub fn power_down<R, D>(rails: &mut R, delay: &mut D, settle_ms: u32)
where
    R: RailControl,
    D: DelayNs,
{
    for rail in [Rail::DisplayDrive, Rail::Auxiliary, Rail::DisplayLogic] {
        rails.set(rail, false);
        info!("power: {} off", rail);
        delay.delay_ms(settle_ms);
    }
}
