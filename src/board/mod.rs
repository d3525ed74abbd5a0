//! femto handheld Board Support Package (BSP), rev 1
//!
//! Maps the physical hardware to named subsystems so the drivers and the
//! main loop never see GPIO numbers or peripheral details.

pub mod pins;
pub mod power;
pub mod raw_gpio;

pub use pins::{FRAME_MS, REV1, SPI_FREQ_MHZ};
pub use power::{BoardRails, DeepSleep};
pub use raw_gpio::GpioSnapshot;

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use embedded_hal_bus::spi::CriticalSectionDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{DriveMode, Input, InputConfig, Level, Output, OutputConfig, Pull},
    peripherals::Peripherals,
    rtc_cntl::Rtc,
    spi::{self, Mode},
    time::{Instant, Rate},
};
use log::info;
use static_cell::StaticCell;

use crate::drivers::display::DisplayLink;
use crate::kernel::clock::{Clock, Tick};

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type OledSpi = CriticalSectionDevice<'static, SpiBus, Output<'static>, Delay>;
pub type Oled = DisplayLink<OledSpi, Output<'static>>;

static SPI_BUS: StaticCell<Mutex<RefCell<SpiBus>>> = StaticCell::new();

#[derive(Debug)]
pub enum InitError {
    Spi(spi::master::ConfigError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Spi(e) => write!(f, "SPI config rejected: {e:?}"),
        }
    }
}

impl core::error::Error for InitError {}

/// Milliseconds since boot, wrapping after ~49 days.
#[derive(Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Tick {
        Tick::from_millis(Instant::now().duration_since_epoch().as_millis() as u32)
    }
}

// Hardware Bundles
/// Input lines, configured and held for the life of the firmware, plus
/// the register snapshot that reads them.
pub struct InputHw {
    _lines: [Input<'static>; 11],
    pub snapshot: GpioSnapshot,
}

/// Display bus and OLED control lines.
pub struct DisplayHw {
    pub link: Oled,
    pub rst: Output<'static>,
}

/// Complete board hardware, ready for the drivers.
pub struct Board {
    pub input: InputHw,
    pub display: DisplayHw,
    pub rails: BoardRails,
    pub sleep: DeepSleep,
    pub clock: SystemClock,
}

impl Board {
    pub fn init(p: Peripherals) -> Result<Self, InitError> {
        let input = Self::init_input(&p);
        let sleep = Self::init_sleep(&p);
        let rails = Self::init_rails(&p);
        let display = Self::init_display(p)?;
        info!("board: rev1 up, SPI {} MHz", SPI_FREQ_MHZ);
        Ok(Board {
            input,
            display,
            rails,
            sleep,
            clock: SystemClock,
        })
    }

    fn init_input(p: &Peripherals) -> InputHw {
        let up = InputConfig::default().with_pull(Pull::Up);
        let down = InputConfig::default().with_pull(Pull::Down);
        // 34-39 are input-only and have no internal pulls
        let external = InputConfig::default().with_pull(Pull::None);

        let lines = unsafe {
            [
                Input::new(p.GPIO21.clone_unchecked(), up),
                Input::new(p.GPIO39.clone_unchecked(), external),
                Input::new(p.GPIO34.clone_unchecked(), external),
                Input::new(p.GPIO35.clone_unchecked(), external),
                Input::new(p.GPIO16.clone_unchecked(), up),
                Input::new(p.GPIO4.clone_unchecked(), up),
                Input::new(p.GPIO25.clone_unchecked(), up),
                Input::new(p.GPIO27.clone_unchecked(), up),
                Input::new(p.GPIO32.clone_unchecked(), down),
                Input::new(p.GPIO36.clone_unchecked(), external),
                Input::new(p.GPIO19.clone_unchecked(), up),
            ]
        };

        InputHw {
            _lines: lines,
            // every line above is an input for as long as `lines` lives
            snapshot: unsafe { GpioSnapshot::new() },
        }
    }

    fn init_sleep(p: &Peripherals) -> DeepSleep {
        DeepSleep {
            rtc: Rtc::new(unsafe { p.LPWR.clone_unchecked() }),
            power: unsafe { p.GPIO32.clone_unchecked() },
            charger: unsafe { p.GPIO36.clone_unchecked() },
            armed: None,
        }
    }

    fn init_rails(p: &Peripherals) -> BoardRails {
        let open_drain = OutputConfig::default().with_drive_mode(DriveMode::OpenDrain);
        // everything off until the power-up sequence runs
        BoardRails {
            logic_a: Output::new(
                unsafe { p.GPIO2.clone_unchecked() },
                Level::Low,
                OutputConfig::default(),
            ),
            logic_b: Output::new(
                unsafe { p.GPIO13.clone_unchecked() },
                Level::Low,
                OutputConfig::default(),
            ),
            hv_en: Output::new(unsafe { p.GPIO17.clone_unchecked() }, Level::High, open_drain),
        }
    }

    fn init_display(p: Peripherals) -> Result<DisplayHw, InitError> {
        // GPIO setup
        let cs = Output::new(p.GPIO5, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO22, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO33, Level::Low, OutputConfig::default());

        // SPI bus
        let spi_cfg = spi::master::Config::default()
            .with_frequency(Rate::from_mhz(SPI_FREQ_MHZ))
            .with_mode(Mode::_0);
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)
            .map_err(InitError::Spi)?
            .with_sck(p.GPIO18)
            .with_mosi(p.GPIO23);

        let bus = SPI_BUS.init(Mutex::new(RefCell::new(spi_bus)));
        let Ok(spi_dev) = CriticalSectionDevice::new(bus, cs, Delay::new());

        Ok(DisplayHw {
            link: DisplayLink::new(spi_dev, dc),
            rst,
        })
    }
}
