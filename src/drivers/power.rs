// Power button hold tracking
//
// The power button is also the wake source, so the press that woke the
// device is usually still held when the first poll runs. Until the line
// has been seen released once, presses are ignored; otherwise the wake
// press would count as a long hold and force an immediate shutdown.
//
// After that, a continuous press is timed from the first poll that sees
// it. Past `warn_after_ms` the UI may show a warning; at
// `force_off_after_ms` the tracker asks for a forced shutdown.

use log::{info, warn};

use super::input::{PinMap, RawInputs};
use crate::kernel::clock::Tick;

pub const DEFAULT_WARN_AFTER_MS: u32 = 2000;
pub const DEFAULT_FORCE_OFF_AFTER_MS: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    None,
    Held,
    ForceShutdown,
}

/// Where a running press sits relative to the hold thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldStage {
    Released,
    Short,
    Warning,
    ForceOff,
}

/// Hold thresholds, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldPolicy {
    warn_after_ms: u32,
    force_off_after_ms: u32,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            warn_after_ms: DEFAULT_WARN_AFTER_MS,
            force_off_after_ms: DEFAULT_FORCE_OFF_AFTER_MS,
        }
    }
}

impl HoldPolicy {
    /// Raises the force-off threshold along with it if needed.
    pub const fn with_warn_after_ms(mut self, ms: u32) -> Self {
        self.warn_after_ms = ms;
        if self.force_off_after_ms < ms {
            self.force_off_after_ms = ms;
        }
        self
    }

    /// Clamped so it never falls below the warning threshold.
    pub const fn with_force_off_after_ms(mut self, ms: u32) -> Self {
        self.force_off_after_ms = if ms < self.warn_after_ms {
            self.warn_after_ms
        } else {
            ms
        };
        self
    }

    pub const fn warn_after_ms(&self) -> u32 {
        self.warn_after_ms
    }

    pub const fn force_off_after_ms(&self) -> u32 {
        self.force_off_after_ms
    }

    pub const fn stage(&self, held_ms: u32) -> HoldStage {
        if held_ms >= self.force_off_after_ms {
            HoldStage::ForceOff
        } else if held_ms >= self.warn_after_ms {
            HoldStage::Warning
        } else {
            HoldStage::Short
        }
    }
}

/// Cross-poll state of the power button. Fresh on every boot,
/// including wake from sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerPressState {
    pub initial: bool,
    pub was_pressed: bool,
    pub press_start: Tick,
}

impl PowerPressState {
    pub const BOOT: PowerPressState = PowerPressState {
        initial: true,
        was_pressed: false,
        press_start: Tick::ZERO,
    };
}

pub struct PowerTracker {
    state: PowerPressState,
    policy: HoldPolicy,
    warned: bool,
}

impl PowerTracker {
    pub const fn new(policy: HoldPolicy) -> Self {
        Self {
            state: PowerPressState::BOOT,
            policy,
            warned: false,
        }
    }

    pub fn state(&self) -> PowerPressState {
        self.state
    }

    /// Back to boot state; the next press is suppressed until a release.
    pub fn reset(&mut self) {
        self.state = PowerPressState::BOOT;
        self.warned = false;
    }

    pub fn poll(&mut self, raw: RawInputs, pins: &PinMap, now: Tick) -> PowerEvent {
        let pressed = raw.is_active(pins.power);

        if !pressed {
            if self.state.initial {
                info!("power: boot press released, hold tracking armed");
            }
            self.state.initial = false;
            self.state.was_pressed = false;
            self.warned = false;
            return PowerEvent::None;
        }

        if self.state.initial {
            return PowerEvent::None;
        }

        if !self.state.was_pressed {
            self.state.was_pressed = true;
            self.state.press_start = now;
        }

        match self.hold_stage(now) {
            HoldStage::ForceOff => PowerEvent::ForceShutdown,
            HoldStage::Warning => {
                if !self.warned {
                    self.warned = true;
                    warn!(
                        "power: held {}ms, forcing off at {}ms",
                        self.held_ms(now),
                        self.policy.force_off_after_ms
                    );
                }
                PowerEvent::Held
            }
            _ => PowerEvent::Held,
        }
    }

    /// How long the current press has lasted, 0 if none is tracked.
    pub fn held_ms(&self, now: Tick) -> u32 {
        if self.state.was_pressed {
            now.elapsed_since(self.state.press_start)
        } else {
            0
        }
    }

    pub fn hold_stage(&self, now: Tick) -> HoldStage {
        if !self.state.was_pressed {
            return HoldStage::Released;
        }
        self.policy.stage(self.held_ms(now))
    }
}

impl Default for PowerTracker {
    fn default() -> Self {
        Self::new(HoldPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::input::tests::PINS;

    fn pressed() -> RawInputs {
        PINS.released().with_line(PINS.power, true)
    }

    fn released() -> RawInputs {
        PINS.released()
    }

    /// Tracker that has already seen one release.
    fn armed() -> PowerTracker {
        let mut t = PowerTracker::default();
        assert_eq!(t.poll(released(), &PINS, Tick(0)), PowerEvent::None);
        t
    }

    #[test]
    fn boot_press_is_suppressed_until_release() {
        let mut t = PowerTracker::default();
        for ms in (0..20_000).step_by(10) {
            assert_eq!(t.poll(pressed(), &PINS, Tick(ms)), PowerEvent::None);
        }
        assert!(t.state().initial);

        assert_eq!(t.poll(released(), &PINS, Tick(20_000)), PowerEvent::None);
        assert!(!t.state().initial);
        assert!(!t.state().was_pressed);

        // timer only starts now
        assert_eq!(t.poll(pressed(), &PINS, Tick(20_010)), PowerEvent::Held);
        assert_eq!(t.state().press_start, Tick(20_010));
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(20_010 + 5_999)),
            PowerEvent::Held
        );
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(20_010 + 6_000)),
            PowerEvent::ForceShutdown
        );
    }

    #[test]
    fn first_press_captures_start_tick() {
        let mut t = armed();
        assert_eq!(t.poll(pressed(), &PINS, Tick(100)), PowerEvent::Held);
        let s = t.state();
        assert!(s.was_pressed);
        assert_eq!(s.press_start, Tick(100));

        // later polls keep the original start
        t.poll(pressed(), &PINS, Tick(900));
        assert_eq!(t.state().press_start, Tick(100));
    }

    #[test]
    fn just_under_warning_stays_short() {
        let mut t = armed();
        t.poll(pressed(), &PINS, Tick(0));
        assert_eq!(t.poll(pressed(), &PINS, Tick(1999)), PowerEvent::Held);
        assert_eq!(t.hold_stage(Tick(1999)), HoldStage::Short);
        assert_eq!(t.hold_stage(Tick(2000)), HoldStage::Warning);
    }

    #[test]
    fn warning_window_still_reports_held() {
        let mut t = armed();
        t.poll(pressed(), &PINS, Tick(0));
        for ms in [2000, 3000, 5999] {
            assert_eq!(t.poll(pressed(), &PINS, Tick(ms)), PowerEvent::Held);
            assert_eq!(t.hold_stage(Tick(ms)), HoldStage::Warning);
        }
    }

    #[test]
    fn force_shutdown_at_threshold_and_beyond() {
        let mut t = armed();
        t.poll(pressed(), &PINS, Tick(0));
        assert_eq!(t.poll(pressed(), &PINS, Tick(5999)), PowerEvent::Held);
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(6000)),
            PowerEvent::ForceShutdown
        );
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(9000)),
            PowerEvent::ForceShutdown
        );
    }

    #[test]
    fn release_clears_running_press() {
        let mut t = armed();
        t.poll(pressed(), &PINS, Tick(0));
        t.poll(pressed(), &PINS, Tick(5000));
        assert_eq!(t.poll(released(), &PINS, Tick(5010)), PowerEvent::None);
        assert!(!t.state().was_pressed);
        assert_eq!(t.hold_stage(Tick(5010)), HoldStage::Released);

        // a new press starts from scratch
        assert_eq!(t.poll(pressed(), &PINS, Tick(5020)), PowerEvent::Held);
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(5020 + 5999)),
            PowerEvent::Held
        );
    }

    #[test]
    fn hold_timing_survives_tick_wrap() {
        let mut t = armed();
        let start = Tick(u32::MAX - 1000);
        t.poll(pressed(), &PINS, start);
        assert_eq!(
            t.poll(pressed(), &PINS, start.wrapping_add(5999)),
            PowerEvent::Held
        );
        assert_eq!(
            t.poll(pressed(), &PINS, start.wrapping_add(6000)),
            PowerEvent::ForceShutdown
        );
    }

    #[test]
    fn custom_policy_moves_thresholds() {
        let policy = HoldPolicy::default()
            .with_warn_after_ms(500)
            .with_force_off_after_ms(1500);
        let mut t = PowerTracker::new(policy);
        t.poll(released(), &PINS, Tick(0));
        t.poll(pressed(), &PINS, Tick(0));
        assert_eq!(t.hold_stage(Tick(500)), HoldStage::Warning);
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(1500)),
            PowerEvent::ForceShutdown
        );
    }

    #[test]
    fn force_off_never_below_warning() {
        let policy = HoldPolicy::default()
            .with_warn_after_ms(3000)
            .with_force_off_after_ms(1000);
        assert_eq!(policy.force_off_after_ms(), 3000);
    }

    #[test]
    fn raising_warning_drags_force_off_along() {
        let policy = HoldPolicy::default().with_warn_after_ms(8000);
        assert_eq!(policy.warn_after_ms(), 8000);
        assert_eq!(policy.force_off_after_ms(), 8000);

        let policy = HoldPolicy::default()
            .with_force_off_after_ms(3000)
            .with_warn_after_ms(4000);
        assert!(policy.force_off_after_ms() >= policy.warn_after_ms());

        // lowering the warning leaves force-off alone
        let policy = HoldPolicy::default().with_warn_after_ms(500);
        assert_eq!(policy.force_off_after_ms(), DEFAULT_FORCE_OFF_AFTER_MS);
    }

    #[test]
    fn warning_window_survives_late_warn_setting() {
        let policy = HoldPolicy::default().with_warn_after_ms(8000);
        let mut t = PowerTracker::new(policy);
        t.poll(released(), &PINS, Tick(0));
        t.poll(pressed(), &PINS, Tick(0));
        assert_eq!(t.poll(pressed(), &PINS, Tick(6000)), PowerEvent::Held);
        assert_eq!(t.hold_stage(Tick(6000)), HoldStage::Short);
        assert_eq!(
            t.poll(pressed(), &PINS, Tick(8000)),
            PowerEvent::ForceShutdown
        );
    }

    #[test]
    fn reset_restores_boot_suppression() {
        let mut t = armed();
        t.poll(pressed(), &PINS, Tick(0));
        t.reset();
        assert_eq!(t.state(), PowerPressState::BOOT);
        assert_eq!(t.poll(pressed(), &PINS, Tick(10_000)), PowerEvent::None);
    }
}
