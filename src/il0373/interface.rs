//! Display interface using SPI
//!
//! The panel shares its SPI bus with the SRAM chip, so chip select is driven by
//! hand instead of going through an `SpiDevice`. Owning the bus mutably is the
//! lock: every exchange ends with a flush before its chip select is released.
use crate::il0373::error::{DisplayError, Error};
use core::convert::Infallible;
use core::fmt::Debug;
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin},
    spi::SpiBus,
};

const RESET_DELAY_MS: u32 = 100;
const BUSY_POLL_INTERVAL_MS: u32 = 1;

/// Stand-in for a control line that is not connected.
///
/// Use it as the type parameter of an absent busy or reset pin, e.g. `None::<Unwired>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unwired;

impl ErrorType for Unwired {
    type Error = Infallible;
}

impl OutputPin for Unwired {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for Unwired {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Log and flatten an SPI error, the panel has no use for the details
pub(crate) fn bus_error<E: Debug>(e: E) -> Error {
    log::error!("SPI bus error: {:?}", e);
    Error::Interface(DisplayError::BusWriteError)
}

/// The connection interface of the IL0373 panel
pub struct DisplayInterface<SPI, BSY, DC, RST, CS, DELAY> {
    /// SPI bus, shared with the SRAM
    spi: SPI,
    /// Low while the controller is busy, `None` when not wired
    busy: Option<BSY>,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for resetting, `None` when not wired
    rst: Option<RST>,
    /// Chip select of the panel, active low
    cs: CS,
    delay: DELAY,
    busy_timeout_ms: Option<u32>,
}

impl<SPI, BSY, DC, RST, CS, DELAY> DisplayInterface<SPI, BSY, DC, RST, CS, DELAY> {
    /// Create the interface, nothing is sent until `begin`
    pub fn new(
        spi: SPI,
        busy: Option<BSY>,
        dc: DC,
        rst: Option<RST>,
        cs: CS,
        delay: DELAY,
        busy_timeout_ms: Option<u32>,
    ) -> Self {
        DisplayInterface {
            spi,
            busy,
            dc,
            rst,
            cs,
            delay,
            busy_timeout_ms,
        }
    }

    /// The shared bus, lent to the SRAM for its own transactions
    pub(crate) fn bus(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Whether a BUSY line is wired
    pub fn has_busy_line(&self) -> bool {
        self.busy.is_some()
    }

    /// Hand back the owned peripherals
    #[allow(clippy::type_complexity)]
    pub fn release(self) -> (SPI, Option<BSY>, DC, Option<RST>, CS, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.cs, self.delay)
    }
}

impl<SPI, BSY, DC, RST, CS, DELAY> DisplayInterface<SPI, BSY, DC, RST, CS, DELAY>
where
    SPI: SpiBus,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    DELAY: DelayNs,
{
    /// Deselect the panel, put D/C into command mode and optionally pulse reset
    pub fn begin(&mut self, reset: bool) -> Result<(), Error> {
        log::debug!("begin: reset={}", reset);
        self.deselect()?;
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        if reset {
            if let Some(rst) = self.rst.as_mut() {
                rst.set_low().map_err(|_| DisplayError::RSError)?;
                self.delay.delay_ms(RESET_DELAY_MS);
                rst.set_high().map_err(|_| DisplayError::RSError)?;
                self.delay.delay_ms(RESET_DELAY_MS);
            } else {
                log::debug!("no reset line wired, skipping reset pulse");
            }
        }
        Ok(())
    }

    /// Send one command byte and return the byte clocked in while it went out.
    ///
    /// With `data` the payload follows and the panel is deselected. Without it,
    /// chip select is released unless `keep_selected` is set, in which case the
    /// caller streams the payload itself.
    pub fn command(
        &mut self,
        command: u8,
        data: Option<&[u8]>,
        keep_selected: bool,
    ) -> Result<u8, Error> {
        log::debug!("command 0x{:02X}", command);
        self.deselect()?;
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.select()?;

        let mut inbuf = [command];
        self.spi.transfer_in_place(&mut inbuf).map_err(|e| {
            log::error!("SPI write error for command 0x{:02X}", command);
            self.abort(bus_error(e))
        })?;

        if let Some(data) = data {
            self.data(data)?;
        } else if !keep_selected {
            self.spi.flush().map_err(|e| self.abort(bus_error(e)))?;
            self.deselect()?;
        }

        Ok(inbuf[0])
    }

    /// Basic function for sending a command without payload
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), Error> {
        self.command(command, None, false).map(|_| ())
    }

    /// Basic function for sending a command and the data belonging to it.
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.command(command, Some(data), false).map(|_| ())
    }

    /// Send a payload and deselect the panel
    pub fn data(&mut self, data: &[u8]) -> Result<(), Error> {
        // high for data
        self.dc
            .set_high()
            .map_err(|_| self.abort(DisplayError::DCError.into()))?;
        self.spi.write(data).map_err(|e| self.abort(bus_error(e)))?;
        self.spi.flush().map_err(|e| self.abort(bus_error(e)))?;
        self.deselect()
    }

    /// Pass `count` bytes from the SRAM through to the panel.
    ///
    /// Both chips must already be selected with the SRAM in sequential read
    /// mode. Every exchange sends the byte the SRAM returned in the previous
    /// one, starting with `first`, the byte that came back with the command.
    pub(crate) fn relay(&mut self, first: u8, count: usize) -> Result<(), Error> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;

        let mut xfer = [first];
        let log_interval = (count / 4).max(1);
        for i in 0..count {
            if i % log_interval == 0 {
                log::debug!("relay progress: {}/{} bytes", i, count);
            }
            self.spi.transfer_in_place(&mut xfer).map_err(bus_error)?;
        }
        self.spi.flush().map_err(bus_error)?;
        log::debug!("relayed {} bytes from SRAM", count);
        Ok(())
    }

    /// Chip select active
    pub(crate) fn select(&mut self) -> Result<(), Error> {
        self.cs
            .set_low()
            .map_err(|_| Error::Interface(DisplayError::CSError))
    }

    /// Chip select inactive
    pub(crate) fn deselect(&mut self) -> Result<(), Error> {
        self.cs
            .set_high()
            .map_err(|_| Error::Interface(DisplayError::CSError))
    }

    /// Release the panel after a failed transfer and pass the error on
    fn abort(&mut self, error: Error) -> Error {
        if self.deselect().is_err() {
            log::warn!("panel chip select stuck low after failed transfer");
        }
        error
    }

    /// Sleep for a fixed time
    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Block until BUSY goes high.
    ///
    /// Without a BUSY line this sleeps for `fallback_ms` instead. With a
    /// configured timeout it gives up with [`Error::BusyTimeout`].
    pub fn wait_until_idle(&mut self, fallback_ms: u32) -> Result<(), Error> {
        let Some(busy) = self.busy.as_mut() else {
            if fallback_ms > 0 {
                log::warn!("no BUSY line wired, sleeping {} ms", fallback_ms);
                self.delay.delay_ms(fallback_ms);
            }
            return Ok(());
        };

        log::debug!("waiting for BUSY to go high");
        let mut waited_ms = 0u32;
        loop {
            match busy.is_high() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(_) => {
                    log::error!("error reading BUSY pin state");
                    return Err(Error::BusyPin);
                }
            }

            if let Some(limit) = self.busy_timeout_ms {
                if waited_ms >= limit {
                    log::error!("timeout waiting for BUSY after {} ms", waited_ms);
                    return Err(Error::BusyTimeout { waited_ms });
                }
            }

            self.delay.delay_ms(BUSY_POLL_INTERVAL_MS);
            waited_ms = waited_ms.saturating_add(BUSY_POLL_INTERVAL_MS);
        }
    }
}
