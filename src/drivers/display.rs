//! Display transfer engine
//!
//! Serializes command and data bytes to the OLED controller over SPI.
//! The controller samples its D/C (select) input while chip-select is
//! asserted, so the select line has to be at the right level before the
//! first clock edge of a transaction and stay there until the last one.
//!
//! The engine owns the select pin exclusively. It drives the pin first,
//! then hands the buffer to the `SpiDevice`, which asserts chip-select,
//! clocks the bytes and releases chip-select before returning. No other
//! code touches the select pin, so its level cannot change while the
//! transaction is on the wire, even when the SPI bus itself is shared
//! with other devices.
//!
//! The select line is left at the level of the last transfer.

use core::fmt::{self, Debug};

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::spi::SpiDevice;

/// Low on the select line means command, high means data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Command,
    Data,
}

impl TransferKind {
    pub const fn from_is_command(is_command: bool) -> Self {
        if is_command {
            TransferKind::Command
        } else {
            TransferKind::Data
        }
    }

    pub const fn select_level(self) -> PinState {
        match self {
            TransferKind::Command => PinState::Low,
            TransferKind::Data => PinState::High,
        }
    }
}

/// A failed transfer. Nothing may be assumed about how many bytes,
/// if any, reached the controller.
#[derive(Debug)]
pub enum BusError<SpiErr, PinErr> {
    /// The SPI transaction failed (bus fault, arbitration, timeout).
    Spi(SpiErr),
    /// The select line could not be driven; nothing was clocked out.
    Select(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> fmt::Display for BusError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Spi(e) => write!(f, "SPI transfer failed: {e:?}"),
            BusError::Select(e) => write!(f, "select line failed: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for BusError<SpiErr, PinErr> {}

pub struct DisplayLink<SPI, DC> {
    spi: SPI,
    dc: DC,
    level: Option<PinState>,
}

impl<SPI, DC> DisplayLink<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self {
            spi,
            dc,
            level: None,
        }
    }

    /// Clock out `bytes` tagged as command or data. Blocks until the
    /// transaction finished. An empty buffer is a no-op.
    pub fn send(
        &mut self,
        bytes: &[u8],
        kind: TransferKind,
    ) -> Result<(), BusError<SPI::Error, DC::Error>> {
        if bytes.is_empty() {
            return Ok(());
        }

        let level = kind.select_level();
        self.dc.set_state(level).map_err(BusError::Select)?;
        self.level = Some(level);

        self.spi.write(bytes).map_err(BusError::Spi)
    }

    #[inline]
    pub fn command(&mut self, cmd: u8) -> Result<(), BusError<SPI::Error, DC::Error>> {
        self.send(&[cmd], TransferKind::Command)
    }

    #[inline]
    pub fn data(&mut self, data: &[u8]) -> Result<(), BusError<SPI::Error, DC::Error>> {
        self.send(data, TransferKind::Data)
    }

    /// Command byte followed by its parameter bytes.
    ///
    /// SSD13xx controllers take parameters in command mode, so both
    /// go out with the select line low.
    pub fn command_with_args(
        &mut self,
        cmd: u8,
        args: &[u8],
    ) -> Result<(), BusError<SPI::Error, DC::Error>> {
        self.command(cmd)?;
        self.send(args, TransferKind::Command)
    }

    /// Level currently driven on the select line, `None` before the
    /// first transfer.
    pub fn select_level(&self) -> Option<PinState> {
        self.level
    }
}
