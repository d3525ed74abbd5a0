// femto-os entry point and main loop
//
// Boot sequence: logger -> hardware -> display rails -> display on
// Main loop: one input snapshot per frame -> log changes -> repeat
//
// A power button held past the force-off threshold leaves the loop and
// hands control to the power-down sequencer. That never comes back
// unless the chip failed to suspend, in which case we halt.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use log::{debug, error, info, warn};

use femto_os::board::{self, Board, FRAME_MS};
use femto_os::drivers::power::{HoldPolicy, PowerEvent};
use femto_os::drivers::rails::{self, PowerUpTiming};
use femto_os::kernel::{Clock, InputReport, InputTask, PowerDown, ShutdownReason, ShutdownTiming};

esp_bootloader_esp_idf::esp_app_desc!();

const CMD_DISPLAY_ON: u8 = 0xAF;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    if let Err(e) = board::REV1.check() {
        error!("pin map: {}", e);
        halt();
    }

    let mut board = match Board::init(peripherals) {
        Ok(board) => board,
        Err(e) => {
            error!("board: {}", e);
            halt();
        }
    };
    let mut delay = Delay::new();

    rails::power_up(
        &mut board.rails,
        &mut board.display.rst,
        &mut delay,
        &PowerUpTiming::default(),
    );
    // the panel stays dark, the frame loop carries on
    if let Err(e) = board.display.link.command(CMD_DISPLAY_ON) {
        warn!("display: {}", e);
    }
    info!("hardware initialized.");

    let mut power_down = match PowerDown::new(
        &mut board.rails,
        &mut board.sleep,
        board::REV1,
        ShutdownTiming::default(),
    ) {
        Ok(power_down) => power_down,
        Err(e) => {
            error!("power-down: {}", e);
            halt();
        }
    };

    let mut input = InputTask::new(board::REV1, HoldPolicy::default());
    let mut last: Option<InputReport> = None;

    loop {
        let now = board.clock.now();
        let report = input.poll(&mut board.input.snapshot, now);

        if last.map(|l| l.buttons) != Some(report.buttons) {
            debug!("pad: {}", report.buttons);
        }
        if last.map(|l| l.charge) != Some(report.charge) {
            info!("charger: {}", report.charge);
        }
        if report.power == PowerEvent::Held && last.map(|l| l.power) == Some(PowerEvent::None) {
            debug!("power: press started at {}", now);
        }
        last = Some(report);

        if report.shutdown_requested() {
            break;
        }
        delay.delay_millis(FRAME_MS);
    }

    let fault = power_down.run(
        ShutdownReason::HeldPower,
        &mut board.input.snapshot,
        &mut delay,
    );

    error!("halting: {}", fault);
    halt()
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
