// Power-down sequencer
//
// Idle -> AwaitingButtonRelease -> Draining -> RailsOff -> SleepArmed -> Asleep
//
// Entered on a forced shutdown (power held past the threshold) or an
// explicit request from the application. The application is expected to
// have stopped its own activity; the sequencer only waits a fixed grace
// period for in-flight display transfers and never preempts anyone.
//
// The wait for the power button to be released has no timeout. Going to
// sleep with the button still down would wake the device straight back
// up, so a stuck button keeps the device awake instead.
//
// Asleep is terminal. If the sleep controller ever returns, the hardware
// state is unknown and the caller must halt.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use super::wake::{SleepControl, WakeConfig};
use crate::drivers::input::{InputSource, PinMap, PinMapError};
use crate::drivers::rails::{self, RailControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    AwaitingButtonRelease,
    Draining,
    RailsOff,
    SleepArmed,
    Asleep,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Idle => "idle",
            Stage::AwaitingButtonRelease => "awaiting button release",
            Stage::Draining => "draining",
            Stage::RailsOff => "rails off",
            Stage::SleepArmed => "sleep armed",
            Stage::Asleep => "asleep",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Power button held past the forced-off threshold.
    HeldPower,
    /// Asked for by the application (menu quit, low battery, ...).
    Requested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    /// The sleep controller returned instead of suspending the chip.
    SleepReturned,
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFault::SleepReturned => f.write_str("sleep entry returned, chip did not suspend"),
        }
    }
}

impl core::error::Error for HardwareFault {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTiming {
    /// Before the first release poll, so the display task can finish
    /// the write it is in.
    pub settle_ms: u32,
    pub release_poll_ms: u32,
    /// After release, before any rail is touched.
    pub grace_ms: u32,
    /// After each rail switch.
    pub rail_settle_ms: u32,
}

impl Default for ShutdownTiming {
    fn default() -> Self {
        Self {
            settle_ms: 20,
            release_poll_ms: 50,
            grace_ms: 1000,
            rail_settle_ms: 10,
        }
    }
}

impl ShutdownTiming {
    pub const fn with_grace_ms(mut self, ms: u32) -> Self {
        self.grace_ms = ms;
        self
    }
}

pub struct PowerDown<R, S> {
    rails: R,
    sleep: S,
    pins: PinMap,
    timing: ShutdownTiming,
    stage: Stage,
    reason: Option<ShutdownReason>,
    held_polls: u32,
    wake: WakeConfig,
    armed: Option<WakeConfig>,
}

impl<R, S> PowerDown<R, S>
where
    R: RailControl,
    S: SleepControl,
{
    /// Fails if the map has no usable wake lines, so a sequence that
    /// could never wake again is refused before anything is switched.
    pub fn new(
        rails: R,
        sleep: S,
        pins: PinMap,
        timing: ShutdownTiming,
    ) -> Result<Self, PinMapError> {
        let wake = WakeConfig::from_pins(&pins)?;
        Ok(Self {
            rails,
            sleep,
            pins,
            timing,
            stage: Stage::Idle,
            reason: None,
            held_polls: 0,
            wake,
            armed: None,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason
    }

    /// Polls so far that still saw the power button down.
    pub fn held_polls(&self) -> u32 {
        self.held_polls
    }

    /// Wake configuration that was armed, once past `SleepArmed`.
    pub fn armed_wake(&self) -> Option<WakeConfig> {
        self.armed
    }

    /// Start the sequence. Ignored if one is already running.
    pub fn request(&mut self, reason: ShutdownReason) {
        if self.stage != Stage::Idle {
            return;
        }
        info!("power-down: {:?}, waiting for power button release", reason);
        self.reason = Some(reason);
        self.held_polls = 0;
        self.enter(Stage::AwaitingButtonRelease);
    }

    /// Advance by one stage (or one poll while waiting for release).
    pub fn step<I, D>(&mut self, inputs: &mut I, delay: &mut D) -> Result<Stage, HardwareFault>
    where
        I: InputSource,
        D: DelayNs,
    {
        match self.stage {
            Stage::Idle => {}
            Stage::AwaitingButtonRelease => {
                if self.held_polls == 0 {
                    delay.delay_ms(self.timing.settle_ms);
                }
                let raw = inputs.read();
                delay.delay_ms(self.timing.release_poll_ms);
                if raw.is_active(self.pins.power) {
                    self.held_polls = self.held_polls.saturating_add(1);
                } else {
                    info!("power-down: released after {} polls", self.held_polls);
                    self.enter(Stage::Draining);
                }
            }
            Stage::Draining => {
                delay.delay_ms(self.timing.grace_ms);
                self.enter(Stage::RailsOff);
            }
            Stage::RailsOff => {
                rails::power_down(&mut self.rails, delay, self.timing.rail_settle_ms);
                self.enter(Stage::SleepArmed);
            }
            Stage::SleepArmed => {
                let wake = self.wake;
                if inputs.read().is_active(self.pins.charger_present) {
                    warn!("power-down: charger present, wake will follow at once");
                }
                info!("power-down: wake {}", wake);
                self.sleep.arm(&wake);
                self.armed = Some(wake);
                self.enter(Stage::Asleep);
            }
            Stage::Asleep => {
                self.sleep.enter();
                error!("power-down: {}", HardwareFault::SleepReturned);
                return Err(HardwareFault::SleepReturned);
            }
        }
        Ok(self.stage)
    }

    /// Drive the whole sequence. Only comes back if sleep failed.
    pub fn run<I, D>(&mut self, reason: ShutdownReason, inputs: &mut I, delay: &mut D) -> HardwareFault
    where
        I: InputSource,
        D: DelayNs,
    {
        self.request(reason);
        loop {
            if let Err(fault) = self.step(inputs, delay) {
                return fault;
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        info!("power-down: {}", stage);
    }
}
