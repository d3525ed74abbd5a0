// Li-ion charger status
//
// The charger IC exposes two status lines: one that is active while a
// USB supply is present, and one that is active while the cell is
// still taking charge. With a supply present and charging finished,
// the cell is full.

use core::fmt;

use super::input::{PinMap, RawInputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStatus {
    NoCharger,
    Charging,
    Full,
}

impl ChargeStatus {
    pub const fn name(self) -> &'static str {
        match self {
            ChargeStatus::NoCharger => "on battery",
            ChargeStatus::Charging => "charging",
            ChargeStatus::Full => "full",
        }
    }

    pub const fn has_supply(self) -> bool {
        !matches!(self, ChargeStatus::NoCharger)
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn decode_charge(raw: RawInputs, pins: &PinMap) -> ChargeStatus {
    if !raw.is_active(pins.charger_present) {
        ChargeStatus::NoCharger
    } else if raw.is_active(pins.charging) {
        ChargeStatus::Charging
    } else {
        ChargeStatus::Full
    }
}
