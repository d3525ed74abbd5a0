//! GPIO |     Function     |      Notes
//! -----+------------------+----------------------------------
//!  2   | OLED 3V3 enable  | Logic rail, high = on (paired with 13)
//!  4   | Pad B            | Active LOW, internal pullup
//!  5   | OLED CS          | Display chip select
//! 13   | OLED 3V3 enable  | Logic rail, high = on (paired with 2)
//! 16   | Pad A            | Active LOW, internal pullup
//! 17   | 14V enable       | Open drain, active LOW; also feeds the audio amp
//! 18   | SPI CLK          |
//! 19   | CHGDET           | Charger IC, LOW while charging
//! 21   | Pad Right        | Active LOW, internal pullup
//! 22   | OLED DC          | Data/Command select
//! 23   | SPI MOSI         | Display is write-only
//! 25   | Pad Select       | Active LOW, internal pullup
//! 27   | Pad Start        | Active LOW, internal pullup
//! 32   | Power button     | Active HIGH, pulldown; RTC wake source
//! 33   | OLED RST         | Reset (active low)
//! 34   | Pad Up           | Active LOW, external pullup (input only)
//! 35   | Pad Down         | Active LOW, external pullup (input only)
//! 36   | CHGSTDBY         | HIGH while USB supply present; RTC wake source
//! 39   | Pad Left         | Active LOW, external pullup (input only)

use crate::drivers::input::{Line, PinMap};

// ----- OLED -----
pub const OLED_CS: u8 = 5;
pub const OLED_DC: u8 = 22;
pub const OLED_RST: u8 = 33;
pub const OLED_3V3_A: u8 = 2;
pub const OLED_3V3_B: u8 = 13;

// ----- SPI bus -----
pub const SPI_CLK: u8 = 18;
pub const SPI_MOSI: u8 = 23;
pub const SPI_FREQ_MHZ: u32 = 10;

// ----- High voltage -----
pub const HV_ENABLE: u8 = 17; // open drain, pull low to enable

// ----- Pad -----
pub const BTN_RIGHT: u8 = 21;
pub const BTN_LEFT: u8 = 39;
pub const BTN_UP: u8 = 34;
pub const BTN_DOWN: u8 = 35;
pub const BTN_A: u8 = 16;
pub const BTN_B: u8 = 4;
pub const BTN_SELECT: u8 = 25;
pub const BTN_START: u8 = 27;

// ----- Power / charger -----
pub const BTN_POWER: u8 = 32;
pub const CHG_STDBY: u8 = 36;
pub const CHG_DET: u8 = 19;

/// Rev-1 board.
pub const REV1: PinMap = PinMap {
    buttons: [
        Line::active_low(BTN_RIGHT),
        Line::active_low(BTN_LEFT),
        Line::active_low(BTN_UP),
        Line::active_low(BTN_DOWN),
        Line::active_low(BTN_A),
        Line::active_low(BTN_B),
        Line::active_low(BTN_SELECT),
        Line::active_low(BTN_START),
    ],
    power: Line::active_high(BTN_POWER),
    charger_present: Line::active_high(CHG_STDBY),
    charging: Line::active_low(CHG_DET),
};

// ----- Main loop -----
pub const FRAME_MS: u32 = 16;
