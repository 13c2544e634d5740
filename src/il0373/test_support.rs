//! Simulated shared SPI bus for driver tests
//!
//! One [`Sim`] backs the bus, the control pins and the delay. The SRAM behind
//! its chip select answers READ/WRITE/RDSR/WRSR like the real chip, the panel
//! side records every command with the data bytes that followed it. A chosen
//! command or SRAM opcode can be made to fail on the bus.
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::spi::{ErrorKind, ErrorType as SpiErrorType, SpiBus};

use crate::il0373::sram::McpSram;

type Sram = McpSram<SimPin>;

/// A command seen by the panel and the data that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    pub command: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
enum SramState {
    Opcode,
    AddressHigh(u8),
    AddressLow(u8, u8),
    Reading(u16),
    Writing(u16),
    WriteStatus,
    ReadStatus,
    Ignore,
}

struct SimState {
    memory: Vec<u8>,
    sram_state: SramState,
    sram_status: u8,
    panel_cs_high: bool,
    sram_cs_high: bool,
    dc_high: bool,
    busy_ready: bool,
    resets: usize,
    transmissions: Vec<Transmission>,
    relay_exchanges: usize,
    slept_ns: u64,
    fail_on: Option<u8>,
}

impl SimState {
    /// A transfer opening with `first` as a panel command or SRAM opcode is refused
    fn refuses(&self, first: Option<&u8>) -> Result<(), ErrorKind> {
        let opens_frame = (!self.panel_cs_high && !self.dc_high)
            || (!self.sram_cs_high && matches!(self.sram_state, SramState::Opcode));
        match (self.fail_on, first) {
            (Some(fail), Some(byte)) if opens_frame && fail == *byte => Err(ErrorKind::Other),
            _ => Ok(()),
        }
    }

    fn exchange(&mut self, mosi: u8) -> u8 {
        let miso = if self.sram_cs_high {
            0x00
        } else {
            self.clock_sram(mosi)
        };
        if !self.panel_cs_high {
            if self.dc_high {
                if let Some(last) = self.transmissions.last_mut() {
                    last.data.push(mosi);
                }
            } else {
                self.transmissions.push(Transmission {
                    command: mosi,
                    data: Vec::new(),
                });
            }
        }
        miso
    }

    fn clock_sram(&mut self, mosi: u8) -> u8 {
        let capacity = self.memory.len();
        let (next, miso) = match self.sram_state {
            SramState::Opcode => match mosi {
                Sram::READ | Sram::WRITE => (SramState::AddressHigh(mosi), 0x00),
                Sram::WRSR => (SramState::WriteStatus, 0x00),
                Sram::RDSR => (SramState::ReadStatus, 0x00),
                _ => (SramState::Ignore, 0x00),
            },
            SramState::AddressHigh(op) => (SramState::AddressLow(op, mosi), 0x00),
            SramState::AddressLow(op, high) => {
                let address = u16::from_be_bytes([high, mosi]);
                if op == Sram::READ {
                    (SramState::Reading(address), 0x00)
                } else {
                    (SramState::Writing(address), 0x00)
                }
            }
            SramState::Reading(address) => {
                let value = self.memory[usize::from(address) % capacity];
                (SramState::Reading(address.wrapping_add(1)), value)
            }
            SramState::Writing(address) => {
                self.memory[usize::from(address) % capacity] = mosi;
                (SramState::Writing(address.wrapping_add(1)), 0x00)
            }
            SramState::WriteStatus => {
                self.sram_status = mosi;
                (SramState::Ignore, 0x00)
            }
            SramState::ReadStatus => (SramState::ReadStatus, self.sram_status),
            SramState::Ignore => (SramState::Ignore, 0x00),
        };
        self.sram_state = next;
        miso
    }
}

/// Shared handle to the simulation
#[derive(Clone)]
pub struct Sim(Rc<RefCell<SimState>>);

impl Sim {
    pub fn new() -> Self {
        Sim(Rc::new(RefCell::new(SimState {
            memory: vec![0; Sram::CAPACITY],
            sram_state: SramState::Ignore,
            sram_status: 0,
            panel_cs_high: true,
            sram_cs_high: true,
            dc_high: false,
            busy_ready: true,
            resets: 0,
            transmissions: Vec::new(),
            relay_exchanges: 0,
            slept_ns: 0,
            fail_on: None,
        })))
    }

    pub fn bus(&self) -> SimBus {
        SimBus(self.clone())
    }

    pub fn pin(&self, line: Line) -> SimPin {
        SimPin {
            sim: self.clone(),
            line,
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.clone())
    }

    /// Forget what happened so far, memory contents stay
    pub fn clear_log(&self) {
        let mut state = self.0.borrow_mut();
        state.transmissions.clear();
        state.relay_exchanges = 0;
        state.slept_ns = 0;
    }

    pub fn transmissions(&self) -> Vec<Transmission> {
        self.0.borrow().transmissions.clone()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.0
            .borrow()
            .transmissions
            .iter()
            .map(|t| t.command)
            .collect()
    }

    /// Data that followed the first occurrence of `command`
    pub fn data_of(&self, command: u8) -> Vec<u8> {
        self.0
            .borrow()
            .transmissions
            .iter()
            .find(|t| t.command == command)
            .map(|t| t.data.clone())
            .unwrap_or_default()
    }

    pub fn memory(&self) -> Vec<u8> {
        self.0.borrow().memory.clone()
    }

    pub fn write_memory(&self, address: usize, bytes: &[u8]) {
        self.0.borrow_mut().memory[address..address + bytes.len()].copy_from_slice(bytes);
    }

    pub fn sram_status(&self) -> u8 {
        self.0.borrow().sram_status
    }

    pub fn relay_exchanges(&self) -> usize {
        self.0.borrow().relay_exchanges
    }

    pub fn resets(&self) -> usize {
        self.0.borrow().resets
    }

    pub fn slept_ms(&self) -> u64 {
        self.0.borrow().slept_ns / 1_000_000
    }

    /// Make transfers opening with this command or opcode fail
    pub fn fail_on(&self, byte: Option<u8>) {
        self.0.borrow_mut().fail_on = byte;
    }

    pub fn set_busy_ready(&self, ready: bool) {
        self.0.borrow_mut().busy_ready = ready;
    }

    /// Neither chip select is asserted
    pub fn chip_selects_released(&self) -> bool {
        let state = self.0.borrow();
        state.panel_cs_high && state.sram_cs_high
    }
}

/// The shared SPI bus
pub struct SimBus(Sim);

impl SpiErrorType for SimBus {
    type Error = ErrorKind;
}

impl SpiBus for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        let mut state = self.0 .0.borrow_mut();
        for word in words.iter_mut() {
            *word = state.exchange(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        let mut state = self.0 .0.borrow_mut();
        state.refuses(words.first())?;
        for word in words {
            state.exchange(*word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), ErrorKind> {
        let mut state = self.0 .0.borrow_mut();
        state.refuses(write.first())?;
        for i in 0..read.len().max(write.len()) {
            let miso = state.exchange(write.get(i).copied().unwrap_or(0x00));
            if let Some(word) = read.get_mut(i) {
                *word = miso;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        let mut state = self.0 .0.borrow_mut();
        state.refuses(words.first())?;
        for word in words.iter_mut() {
            if state.dc_high && !state.panel_cs_high && !state.sram_cs_high {
                state.relay_exchanges += 1;
            }
            *word = state.exchange(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Control lines of the simulated board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    PanelCs,
    SramCs,
    Dc,
    Rst,
    Busy,
}

pub struct SimPin {
    sim: Sim,
    line: Line,
}

impl PinErrorType for SimPin {
    type Error = Infallible;
}

impl SimPin {
    fn drive(&mut self, high: bool) {
        let mut state = self.sim.0.borrow_mut();
        match self.line {
            Line::PanelCs => state.panel_cs_high = high,
            Line::SramCs => {
                if state.sram_cs_high && !high {
                    state.sram_state = SramState::Opcode;
                }
                state.sram_cs_high = high;
            }
            Line::Dc => state.dc_high = high,
            Line::Rst => {
                if !high {
                    state.resets += 1;
                }
            }
            Line::Busy => {}
        }
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.sim.0.borrow().busy_ready)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.sim.0.borrow().busy_ready)
    }
}

/// Records how long the driver slept
pub struct SimDelay(Sim);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0 .0.borrow_mut().slept_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0 .0.borrow_mut().slept_ns += u64::from(ms) * 1_000_000;
    }
}
