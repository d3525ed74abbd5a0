// Per-frame input poll
//
// One snapshot per frame feeds all three decoders, so buttons, power
// and charger state always describe the same instant. The synthetic
// power bit rides along in the button mask once the tracker reports a
// hold, which lets the application treat it like any other button.

use crate::drivers::battery::{ChargeStatus, decode_charge};
use crate::drivers::button::ButtonMask;
use crate::drivers::input::{InputSource, PinMap, RawInputs, decode_buttons};
use crate::drivers::power::{HoldPolicy, HoldStage, PowerEvent, PowerTracker};

use super::clock::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputReport {
    pub raw: RawInputs,
    pub buttons: ButtonMask,
    pub power: PowerEvent,
    pub charge: ChargeStatus,
}

impl InputReport {
    pub fn shutdown_requested(&self) -> bool {
        self.power == PowerEvent::ForceShutdown
    }
}

pub struct InputTask {
    pins: PinMap,
    tracker: PowerTracker,
}

impl InputTask {
    pub const fn new(pins: PinMap, policy: HoldPolicy) -> Self {
        Self {
            pins,
            tracker: PowerTracker::new(policy),
        }
    }

    pub fn hold_stage(&self, now: Tick) -> HoldStage {
        self.tracker.hold_stage(now)
    }

    pub fn poll<I: InputSource>(&mut self, source: &mut I, now: Tick) -> InputReport {
        let raw = source.read();
        let mut buttons = decode_buttons(raw, &self.pins);
        let power = self.tracker.poll(raw, &self.pins, now);
        if power != PowerEvent::None {
            buttons |= ButtonMask::POWER;
        }
        InputReport {
            raw,
            buttons,
            power,
            charge: decode_charge(raw, &self.pins),
        }
    }
}
