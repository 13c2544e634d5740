//! Bit-plane addressing and storage
//!
//! Columns are stored right to left with rows as the fast index, one bit per
//! pixel and the top row of each byte in the most significant bit. The red
//! plane follows the black/white plane, `plane_size` bytes further in.
use alloc::vec;
use alloc::vec::Vec;

use crate::il0373::error::Error;
use crate::il0373::flag::Flag;
use crate::il0373::sram::McpSram;
use embedded_hal::{digital::OutputPin, spi::SpiBus};

/// Byte address inside a plane and the mask of the pixel's bit in that byte,
/// `None` outside a `width` × `height` panel.
///
/// Column 0 is folded onto column 1, the panel does not show it.
pub fn pixel_address(x: u16, y: u16, width: u16, height: u16) -> Option<(usize, u8)> {
    if x >= width || y >= height {
        return None;
    }
    let x = if x == 0 { 1 } else { x };
    let index = usize::from(width.checked_sub(x)?) * usize::from(height) + usize::from(y);
    Some((index / 8, 1 << (7 - (y % 8))))
}

/// Where the two bit-planes live, chosen once at construction
pub enum PlaneStorage<CS> {
    /// Both planes in local memory, black/white first
    Local(Vec<u8>),
    /// Both planes in the external SRAM, black/white at address 0
    Sram(McpSram<CS>),
}

impl<CS> PlaneStorage<CS> {
    /// Local planes for a panel with `plane_size` bytes per plane, cleared to white
    pub fn local(plane_size: usize) -> Self {
        PlaneStorage::Local(vec![Flag::FILL_WHITE; plane_size * 2])
    }

    /// Whether the planes are kept in the SRAM
    pub fn is_sram(&self) -> bool {
        matches!(self, PlaneStorage::Sram(_))
    }
}

impl<CS: OutputPin> PlaneStorage<CS> {
    /// Read one plane byte
    pub fn read8<SPI: SpiBus>(&mut self, bus: &mut SPI, address: usize) -> Result<u8, Error> {
        match self {
            PlaneStorage::Local(buffer) => Ok(buffer[address]),
            PlaneStorage::Sram(sram) => sram.read8(bus, sram_address(address)),
        }
    }

    /// Write one plane byte
    pub fn write8<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        address: usize,
        value: u8,
    ) -> Result<(), Error> {
        match self {
            PlaneStorage::Local(buffer) => {
                buffer[address] = value;
                Ok(())
            }
            PlaneStorage::Sram(sram) => sram.write8(bus, sram_address(address), value),
        }
    }

    /// Set `length` bytes from `start` to `value`
    pub fn fill<SPI: SpiBus>(
        &mut self,
        bus: &mut SPI,
        start: usize,
        length: usize,
        value: u8,
    ) -> Result<(), Error> {
        match self {
            PlaneStorage::Local(buffer) => {
                buffer[start..start + length].fill(value);
                Ok(())
            }
            PlaneStorage::Sram(sram) => sram.erase(bus, sram_address(start), length, value),
        }
    }
}

// Construction checks both planes fit the SRAM
fn sram_address(address: usize) -> u16 {
    address as u16
}
