// firmware core for the femto handheld (ESP32, SPI OLED)

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "board")]
pub mod board;
pub mod drivers;
pub mod kernel;
