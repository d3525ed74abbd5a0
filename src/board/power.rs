//! Rail switches and deep sleep for the rev-1 board.
//!
//! The OLED logic supply is switched by two GPIOs in parallel (2 and 13),
//! high = on. The 14V drive generator sits behind an open-drain enable on
//! GPIO17 that is pulled low to run it. The audio amplifier hangs off the
//! same 14V output, so the auxiliary rail has no switch of its own on
//! this revision and follows the drive rail.

use esp_hal::gpio::{Level, Output, RtcPin};
use esp_hal::peripherals::{GPIO32, GPIO36};
use esp_hal::rtc_cntl::Rtc;
use esp_hal::rtc_cntl::sleep::{Ext1WakeupSource, RtcSleepConfig, WakeupLevel};
use log::{debug, error};

use super::pins::{BTN_POWER, CHG_STDBY};
use crate::drivers::rails::{Rail, RailControl};
use crate::kernel::wake::{SleepControl, WakeConfig};

pub struct BoardRails {
    pub(super) logic_a: Output<'static>,
    pub(super) logic_b: Output<'static>,
    pub(super) hv_en: Output<'static>,
}

impl RailControl for BoardRails {
    fn set(&mut self, rail: Rail, on: bool) {
        match rail {
            Rail::DisplayLogic => {
                let level = Level::from(on);
                self.logic_a.set_level(level);
                self.logic_b.set_level(level);
            }
            // active low
            Rail::DisplayDrive => self.hv_en.set_level(Level::from(!on)),
            Rail::Auxiliary => debug!("rails: aux follows 14V on rev1"),
        }
    }
}

/// ESP32 deep sleep with ext1 wake on the power button and charger pins.
pub struct DeepSleep {
    pub(super) rtc: Rtc<'static>,
    pub(super) power: GPIO32<'static>,
    pub(super) charger: GPIO36<'static>,
    pub(super) armed: Option<WakeConfig>,
}

impl SleepControl for DeepSleep {
    fn arm(&mut self, config: &WakeConfig) {
        self.armed = Some(*config);
    }

    fn enter(&mut self) {
        let Some(wake) = self.armed else {
            error!("sleep: entered without wake sources");
            return;
        };

        let mut cfg = RtcSleepConfig::deep();
        cfg.set_rtc_fastmem_pd_en(!wake.retain_fast_mem);

        let mut both: [&mut dyn RtcPin; 2] = [&mut self.power, &mut self.charger];
        let pins: &mut [&mut dyn RtcPin] =
            match (wake.wakes_on(BTN_POWER), wake.wakes_on(CHG_STDBY)) {
                (true, true) => &mut both[..],
                (true, false) => &mut both[..1],
                (false, true) => &mut both[1..],
                (false, false) => {
                    error!("sleep: wake mask {:#x} has no RTC pin", wake.mask);
                    return;
                }
            };

        let ext1 = Ext1WakeupSource::new(pins, WakeupLevel::High);
        self.rtc.sleep(&cfg, &[&ext1]);
    }
}
