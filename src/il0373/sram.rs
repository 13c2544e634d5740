//! Microchip 23K640 style serial SRAM holding the bit-planes
//!
//! The chip sits on the same SPI bus as the panel. Every call borrows the bus
//! for one transaction and releases chip select before returning, except
//! [`McpSram::begin_sequential_read`] which leaves the chip streaming so the
//! panel can be fed directly from it.
use crate::il0373::error::{DisplayError, Error};
use crate::il0373::interface::bus_error;
use embedded_hal::{digital::OutputPin, spi::SpiBus};

/// Send 32 bytes at a time when filling a range
const ERASE_CHUNK_SIZE: usize = 32;

/// Serial SRAM driver, owns only its chip select
pub struct McpSram<CS> {
    cs: CS,
}

impl<CS> McpSram<CS> {
    /// Read data starting at the given address
    pub const READ: u8 = 0x03;
    /// Write data starting at the given address
    pub const WRITE: u8 = 0x02;
    /// Read the status register
    pub const RDSR: u8 = 0x05;
    /// Write the status register
    pub const WRSR: u8 = 0x01;

    /// Status register value for sequential mode, the address wraps around the whole array
    pub const SEQUENTIAL_MODE: u8 = 0x40;

    /// Bytes available on the chip
    pub const CAPACITY: usize = 8192;

    fn header(opcode: u8, address: u16) -> [u8; 3] {
        let [hi, lo] = address.to_be_bytes();
        [opcode, hi, lo]
    }
}

impl<CS: OutputPin> McpSram<CS> {
    /// Take the chip select and deselect the chip
    pub fn new(mut cs: CS) -> Result<Self, Error> {
        cs.set_high()
            .map_err(|_| Error::Interface(DisplayError::CSError))?;
        Ok(McpSram { cs })
    }

    /// Switch the chip to sequential mode
    pub fn init<SPI: SpiBus>(&mut self, bus: &mut SPI) -> Result<(), Error> {
        log::debug!("sram: sequential mode");
        self.select()?;
        bus.write(&[Self::WRSR, Self::SEQUENTIAL_MODE])
            .map_err(|e| self.abort(bus_error(e)))?;
        self.finish(bus)
    }

    /// Read the status register
    pub fn status<SPI: SpiBus>(&mut self, bus: &mut SPI) -> Result<u8, Error> {
        self.select()?;
        bus.write(&[Self::RDSR])
            .map_err(|e| self.abort(bus_error(e)))?;
        let mut status = [0u8];
        bus.read(&mut status)
            .map_err(|e| self.abort(bus_error(e)))?;
        self.finish(bus)?;
        Ok(status[0])
    }

    /// Read `buf.len()` bytes starting at `address`
    pub fn read<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: u16,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.select()?;
        bus.write(&Self::header(Self::READ, address))
            .map_err(|e| self.abort(bus_error(e)))?;
        bus.read(buf).map_err(|e| self.abort(bus_error(e)))?;
        self.finish(bus)
    }

    /// Read one byte
    pub fn read8<SPI: SpiBus>(&mut self, bus: &mut SPI, address: u16) -> Result<u8, Error> {
        let mut byte = [0u8];
        self.read(bus, address, &mut byte)?;
        Ok(byte[0])
    }

    /// Write `data` starting at `address`
    pub fn write<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: u16,
        data: &[u8],
    ) -> Result<(), Error> {
        self.select()?;
        bus.write(&Self::header(Self::WRITE, address))
            .map_err(|e| self.abort(bus_error(e)))?;
        bus.write(data).map_err(|e| self.abort(bus_error(e)))?;
        self.finish(bus)
    }

    /// Write one byte
    pub fn write8<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: u16,
        value: u8,
    ) -> Result<(), Error> {
        self.write(bus, address, &[value])
    }

    /// Fill `length` bytes starting at `address` with `value`
    pub fn erase<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: u16,
        length: usize,
        value: u8,
    ) -> Result<(), Error> {
        log::debug!(
            "sram: erase {} bytes at 0x{:04X} with 0x{:02X}",
            length,
            address,
            value
        );
        self.select()?;
        bus.write(&Self::header(Self::WRITE, address))
            .map_err(|e| self.abort(bus_error(e)))?;

        let buffer = [value; ERASE_CHUNK_SIZE];
        let full_chunks = length / ERASE_CHUNK_SIZE;
        let remainder = length % ERASE_CHUNK_SIZE;
        for _ in 0..full_chunks {
            bus.write(&buffer).map_err(|e| self.abort(bus_error(e)))?;
        }
        if remainder > 0 {
            bus.write(&buffer[..remainder])
                .map_err(|e| self.abort(bus_error(e)))?;
        }
        self.finish(bus)
    }

    /// Select the chip and send a read header, leaving it selected.
    ///
    /// Every byte clocked afterwards returns the next stored byte until
    /// [`McpSram::deselect`] is called. On error the chip is already released.
    pub fn begin_sequential_read<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: u16,
    ) -> Result<(), Error> {
        log::debug!("sram: sequential read from 0x{:04X}", address);
        self.select()?;
        bus.write(&Self::header(Self::READ, address))
            .map_err(|e| self.abort(bus_error(e)))?;
        bus.flush().map_err(|e| self.abort(bus_error(e)))
    }

    /// Release chip select
    pub fn deselect(&mut self) -> Result<(), Error> {
        self.cs
            .set_high()
            .map_err(|_| Error::Interface(DisplayError::CSError))
    }

    /// Hand back the chip select
    pub fn release(self) -> CS {
        self.cs
    }

    fn select(&mut self) -> Result<(), Error> {
        self.cs
            .set_low()
            .map_err(|_| Error::Interface(DisplayError::CSError))
    }

    fn finish<SPI: SpiBus>(&mut self, bus: &mut SPI) -> Result<(), Error> {
        bus.flush().map_err(|e| self.abort(bus_error(e)))?;
        self.deselect()
    }

    /// Release the chip after a failed transfer and pass the error on.
    ///
    /// The chip only leaves a streaming read or write on a rising chip select.
    fn abort(&mut self, error: Error) -> Error {
        if self.deselect().is_err() {
            log::warn!("sram: chip select stuck low after failed transfer");
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn selected_once() -> Vec<PinTransaction> {
        vec![
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]
    }

    #[test]
    fn init_enables_sequential_mode() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x01, 0x40]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&selected_once());

        let mut sram = McpSram::new(cs.clone()).unwrap();
        sram.init(&mut spi).unwrap();

        spi.done();
        cs.done();
    }

    #[test]
    fn read8_sends_big_endian_address() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x03, 0x0B, 0x48]),
            SpiTransaction::read_vec(vec![0xA5]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&selected_once());

        let mut sram = McpSram::new(cs.clone()).unwrap();
        assert_eq!(sram.read8(&mut spi, 0x0B48).unwrap(), 0xA5);

        spi.done();
        cs.done();
    }

    #[test]
    fn write8_sends_header_then_value() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x02, 0x00, 0x13]),
            SpiTransaction::write_vec(vec![0x7F]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&selected_once());

        let mut sram = McpSram::new(cs.clone()).unwrap();
        sram.write8(&mut spi, 0x0013, 0x7F).unwrap();

        spi.done();
        cs.done();
    }

    #[test]
    fn erase_streams_value_in_chunks() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x02, 0x01, 0x00]),
            SpiTransaction::write_vec(vec![0x00; 32]),
            SpiTransaction::write_vec(vec![0x00; 32]),
            SpiTransaction::write_vec(vec![0x00; 6]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&selected_once());

        let mut sram = McpSram::new(cs.clone()).unwrap();
        sram.erase(&mut spi, 0x0100, 70, 0x00).unwrap();

        spi.done();
        cs.done();
    }

    #[test]
    fn sequential_read_keeps_chip_selected() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x03, 0x0B, 0x48]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);

        let mut sram = McpSram::new(cs.clone()).unwrap();
        sram.begin_sequential_read(&mut spi, 0x0B48).unwrap();

        spi.done();
        cs.done();
    }

    #[test]
    fn status_reads_one_byte() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x05]),
            SpiTransaction::read_vec(vec![0x40]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&selected_once());

        let mut sram = McpSram::new(cs.clone()).unwrap();
        assert_eq!(
            sram.status(&mut spi).unwrap(),
            McpSram::<PinMock>::SEQUENTIAL_MODE
        );

        spi.done();
        cs.done();
    }
}
