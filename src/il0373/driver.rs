//! IL0373 Display Driver Implementation
//!
//! This module contains the main driver implementation for the IL0373 tri-color
//! e-paper controller. It owns the bit-planes and runs the refresh sequence.
//!
//! ## Refresh sequence
//!
//! [`Il0373::display`] runs three steps, each a fresh start:
//!
//! - `power_up()` - power on, panel setting, CDI, PLL, resolution, VCOM
//! - plane transfer - `DTM1` with the black/white plane, `DTM2` with the red plane
//! - `update()` - refresh, border/VCOM for power down, power off
//!
//! ## Critical Implementation Details
//!
//! ### SRAM pass-through
//!
//! With the planes in SRAM the panel is fed straight from the chip: the SRAM is
//! put into sequential read first and kept selected, so the byte clocked in
//! while the `DTM` command goes out is already the first byte of the plane.
//! Every following exchange writes the previous SRAM byte to the panel while
//! the next one arrives.
//!
//! ### BUSY Pin Wait
//!
//! The BUSY line is low while the controller works. Without a BUSY line the
//! driver sleeps for a fixed time instead: 3 s after power on, 15 s after
//! refresh.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::il0373::color::Color;
use crate::il0373::config::Config;
use crate::il0373::error::Error;
use crate::il0373::graphics::Canvas;
use crate::il0373::interface::{DisplayInterface, Unwired};
use crate::il0373::pins::Pins;
use crate::il0373::plane::{pixel_address, PlaneStorage};
use crate::il0373::sram::McpSram;
use crate::il0373::{cmd::Cmd, flag::Flag};

/// Sleep after power on when no BUSY line is wired
const POWER_ON_FALLBACK_MS: u32 = 3_000;
/// Settling time after power on
const POWER_ON_SETTLE_MS: u32 = 200;
/// Sleep after refresh when no BUSY line is wired
const REFRESH_FALLBACK_MS: u32 = 15_000;
/// Settling time after power off
const POWER_OFF_SETTLE_MS: u32 = 2_000;
/// Pause between the two planes when streaming from SRAM
const SRAM_PLANE_SETTLE_MS: u32 = 2;
/// Pause between the two planes when writing local buffers
const LOCAL_PLANE_SETTLE_MS: u32 = 20;

/// IL0373 E-Paper Display Driver
///
/// ## Type Parameters
///
/// - `SPI` - SPI bus, shared with the SRAM
/// - `BSY` - BUSY input pin (LOW while the controller is busy)
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `CS` - chip select of the panel
/// - `SRCS` - chip select of the SRAM, [`Unwired`] for local buffers
/// - `DELAY` - Delay provider for timing
pub struct Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY> {
    /// The display interface
    pub interface: DisplayInterface<SPI, BSY, DC, RST, CS, DELAY>,
    storage: PlaneStorage<SRCS>,
    config: Config,
}

impl<SPI, BSY, DC, RST, CS, DELAY> Il0373<SPI, BSY, DC, RST, CS, Unwired, DELAY>
where
    SPI: SpiBus,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    DELAY: DelayNs,
{
    /// Create and initialize the driver with both planes in local memory
    pub fn with_local_buffer(
        spi: SPI,
        pins: Pins<BSY, DC, RST, CS>,
        delay: DELAY,
        config: Config,
    ) -> Result<Self, Error> {
        let storage = PlaneStorage::local(config.plane_size());
        Self::new(spi, pins, storage, delay, config)
    }
}

impl<SPI, BSY, DC, RST, CS, SRCS, DELAY> Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY>
where
    SPI: SpiBus,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    SRCS: OutputPin,
    DELAY: DelayNs,
{
    /// Create and initialize the driver with both planes in the SRAM behind `sram_cs`
    pub fn with_sram(
        spi: SPI,
        pins: Pins<BSY, DC, RST, CS>,
        sram_cs: SRCS,
        delay: DELAY,
        config: Config,
    ) -> Result<Self, Error> {
        let storage = PlaneStorage::Sram(McpSram::new(sram_cs)?);
        Self::new(spi, pins, storage, delay, config)
    }

    /// Create and initialize the display driver
    pub fn new(
        spi: SPI,
        pins: Pins<BSY, DC, RST, CS>,
        storage: PlaneStorage<SRCS>,
        delay: DELAY,
        config: Config,
    ) -> Result<Self, Error> {
        let invalid = Error::InvalidGeometry {
            width: config.width,
            height: config.height,
        };
        if !config.is_packed() {
            log::error!("{}x{} does not pack into bytes", config.width, config.height);
            return Err(invalid);
        }
        match &storage {
            PlaneStorage::Sram(_) if config.plane_size() * 2 > McpSram::<SRCS>::CAPACITY => {
                log::error!("two {} byte planes do not fit the SRAM", config.plane_size());
                return Err(invalid);
            }
            PlaneStorage::Local(buffer) if buffer.len() != config.plane_size() * 2 => {
                log::error!(
                    "local buffer holds {} bytes, two planes need {}",
                    buffer.len(),
                    config.plane_size() * 2
                );
                return Err(invalid);
            }
            _ => {}
        }

        let Pins { busy, dc, rst, cs } = pins;
        let interface =
            DisplayInterface::new(spi, busy, dc, rst, cs, delay, config.busy_timeout_ms);
        let mut il0373 = Il0373 {
            interface,
            storage,
            config,
        };
        if let PlaneStorage::Sram(sram) = &mut il0373.storage {
            sram.init(il0373.interface.bus())?;
        }
        il0373.begin()?;
        Ok(il0373)
    }

    /// Reset the controller and load the power settings
    pub fn begin(&mut self) -> Result<(), Error> {
        log::info!(
            "Initializing {}x{} IL0373 panel",
            self.config.width,
            self.config.height
        );
        self.interface.begin(self.config.reset_on_begin)?;
        self.interface.wait_until_idle(0)?;

        self.interface
            .cmd_with_data(Cmd::POWER_SETTING, &Flag::POWER_SETTING)?;
        self.interface
            .cmd_with_data(Cmd::BOOSTER_SOFT_START, &Flag::BOOSTER_SOFT_START)?;
        Ok(())
    }

    /// Power up the display and configure panel, timing and resolution
    pub fn power_up(&mut self) -> Result<(), Error> {
        log::info!("Powering up display");
        let resolution = self.resolution();
        self.interface.cmd(Cmd::POWER_ON)?;
        self.interface.wait_until_idle(POWER_ON_FALLBACK_MS)?;
        self.interface.delay_ms(POWER_ON_SETTLE_MS);

        self.interface
            .cmd_with_data(Cmd::PANEL_SETTING, &[Flag::PANEL_SETTING_TRICOLOR])?;
        self.interface
            .cmd_with_data(Cmd::CDI, &[Flag::CDI_REFRESH])?;
        self.interface
            .cmd_with_data(Cmd::PLL, &[Flag::PLL_100HZ])?;
        self.interface
            .cmd_with_data(Cmd::RESOLUTION, &resolution)?;
        self.interface
            .cmd_with_data(Cmd::VCM_DC_SETTING, &[Flag::VCM_DC_REFRESH])?;
        Ok(())
    }

    /// Refresh the panel from its RAM and power it off
    pub fn update(&mut self) -> Result<(), Error> {
        log::info!("Refreshing display");
        self.interface.cmd(Cmd::DISPLAY_REFRESH)?;
        self.interface.wait_until_idle(REFRESH_FALLBACK_MS)?;

        self.interface
            .cmd_with_data(Cmd::CDI, &[Flag::CDI_POWER_DOWN])?;
        self.interface
            .cmd_with_data(Cmd::VCM_DC_SETTING, &[Flag::VCM_DC_POWER_DOWN])?;
        self.interface.cmd(Cmd::POWER_OFF)?;
        self.interface.delay_ms(POWER_OFF_SETTLE_MS);
        Ok(())
    }

    /// Show the contents of the bit-planes
    pub fn display(&mut self) -> Result<(), Error> {
        log::info!("Starting display update");
        self.power_up()?;
        self.write_planes()?;
        self.update()?;
        log::info!("Display update completed");
        Ok(())
    }

    /// Put the controller into deep sleep, only a reset wakes it up again
    pub fn sleep(&mut self) -> Result<(), Error> {
        log::info!("Entering deep sleep");
        self.interface
            .cmd_with_data(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_CHECK])
    }

    /// Height then width, two little-endian bytes each
    fn resolution(&self) -> [u8; 4] {
        let [h_lo, h_hi] = self.config.height.to_le_bytes();
        let [w_lo, w_hi] = self.config.width.to_le_bytes();
        [h_lo, h_hi, w_lo, w_hi]
    }

    fn write_planes(&mut self) -> Result<(), Error> {
        let bw_size = self.bw_bufsize();
        let red_size = self.red_bufsize();

        match &mut self.storage {
            PlaneStorage::Sram(sram) => {
                log::debug!("Streaming planes from SRAM");
                Self::relay_plane(&mut self.interface, sram, Cmd::DTM1, 0, bw_size)?;
                self.interface.delay_ms(SRAM_PLANE_SETTLE_MS);
                Self::relay_plane(&mut self.interface, sram, Cmd::DTM2, bw_size, red_size)?;
            }
            PlaneStorage::Local(buffer) => {
                log::debug!("Writing planes from local memory");
                let (bw_plane, red_plane) = buffer.split_at(bw_size);
                self.interface.command(Cmd::DTM1, None, true)?;
                self.interface.data(bw_plane)?;
                self.interface.delay_ms(LOCAL_PLANE_SETTLE_MS);
                self.interface.command(Cmd::DTM2, None, true)?;
                self.interface.data(red_plane)?;
            }
        }
        Ok(())
    }

    /// Feed one plane from the SRAM to the panel
    fn relay_plane(
        interface: &mut DisplayInterface<SPI, BSY, DC, RST, CS, DELAY>,
        sram: &mut McpSram<SRCS>,
        command: u8,
        base: usize,
        length: usize,
    ) -> Result<(), Error> {
        // releases the SRAM itself when it fails
        sram.begin_sequential_read(interface.bus(), base as u16)?;

        // first data byte from SRAM comes in while the command goes out
        let relayed = interface
            .command(command, None, true)
            .and_then(|first| interface.relay(first, length));

        // both chips are released whichever step failed
        let panel = interface.deselect();
        let chip = sram.deselect();
        relayed.and(panel).and(chip)
    }

    /// Set the pixels of the whole panel from an RGB source.
    ///
    /// Pure red goes to the red plane, pure black clears the black/white bit,
    /// everything else is white. Costs one SRAM round trip per pixel.
    pub fn load_pixels<F>(
        &mut self,
        width: u32,
        height: u32,
        mut pixel_at: F,
    ) -> Result<(), Error>
    where
        F: FnMut(u32, u32) -> Rgb888,
    {
        let expected_width = u32::from(self.config.width);
        let expected_height = u32::from(self.config.height);
        if width != expected_width || height != expected_height {
            return Err(Error::InvalidImage {
                expected_width,
                expected_height,
                reason: "image must be same dimensions as display",
            });
        }

        log::info!("Loading {}x{} image", width, height);
        for y in 0..height {
            for x in 0..width {
                // column 0 takes the pixel of column 1
                let source_x = if x == 0 && width > 1 { 1 } else { x };
                let color = Color::from_rgb(pixel_at(source_x, y));
                self.draw_pixel(x as u16, y as u16, color)?;
            }
        }
        Ok(())
    }

    /// Set the pixels from an image, which must be RGB and the size of the display
    #[cfg(feature = "image")]
    pub fn image(&mut self, image: &image::DynamicImage) -> Result<(), Error> {
        let rgb = image.as_rgb8().ok_or(Error::InvalidImage {
            expected_width: u32::from(self.config.width),
            expected_height: u32::from(self.config.height),
            reason: "image must be in mode RGB",
        })?;
        self.load_pixels(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            Rgb888::new(r, g, b)
        })
    }

    /// Read a pixel back from the planes, `None` outside the panel.
    ///
    /// A red bit wins over the black/white plane.
    pub fn read_pixel(&mut self, x: u16, y: u16) -> Result<Option<Color>, Error> {
        let Some((address, mask)) = pixel_address(x, y, self.config.width, self.config.height)
        else {
            return Ok(None);
        };
        let bus = self.interface.bus();

        let red = self.storage.read8(bus, address + self.config.plane_size())?;
        if red & mask == 0 {
            return Ok(Some(Color::Red));
        }
        let bw = self.storage.read8(bus, address)?;
        Ok(Some(if bw & mask == 0 {
            Color::Black
        } else {
            Color::White
        }))
    }
}

impl<SPI, BSY, DC, RST, CS, SRCS, DELAY> Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY> {
    /// Bytes in the black/white plane
    pub fn bw_bufsize(&self) -> usize {
        self.config.plane_size()
    }

    /// Bytes in the red plane
    pub fn red_bufsize(&self) -> usize {
        self.config.plane_size()
    }

    /// Configuration the driver was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The local black/white and red planes, `None` when they live in SRAM
    pub fn planes(&self) -> Option<(&[u8], &[u8])> {
        match &self.storage {
            PlaneStorage::Local(buffer) => Some(buffer.split_at(self.config.plane_size())),
            PlaneStorage::Sram(_) => None,
        }
    }

    /// Take the driver apart
    #[allow(clippy::type_complexity)]
    pub fn release(
        self,
    ) -> (
        DisplayInterface<SPI, BSY, DC, RST, CS, DELAY>,
        PlaneStorage<SRCS>,
    ) {
        (self.interface, self.storage)
    }
}

impl<SPI, BSY, DC, RST, CS, SRCS, DELAY> Canvas for Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY>
where
    SPI: SpiBus,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    SRCS: OutputPin,
    DELAY: DelayNs,
{
    type Error = Error;

    fn width(&self) -> u16 {
        self.config.width
    }

    fn height(&self) -> u16 {
        self.config.height
    }

    /// Read-modify-write the pixel's bit, red pixels in the red plane
    fn draw_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), Error> {
        let Some((address, mask)) = pixel_address(x, y, self.config.width, self.config.height)
        else {
            return Ok(());
        };
        let address = if color.is_red() {
            address + self.bw_bufsize()
        } else {
            address
        };

        let bus = self.interface.bus();
        let current = self.storage.read8(bus, address)?;
        let next = match color {
            Color::White => current | mask,
            Color::Black | Color::Red => current & !mask,
            Color::Inverse => current ^ mask,
            Color::Dark | Color::Light => return Ok(()),
        };
        self.storage.write8(bus, address, next)
    }

    /// Set both planes in one go, bypassing the per-pixel path
    fn fill(&mut self, color: Color) -> Result<(), Error> {
        let black_fill = if color == Color::Black {
            Flag::FILL_BLACK
        } else {
            Flag::FILL_WHITE
        };
        let red_fill = if color == Color::Red {
            Flag::FILL_RED
        } else {
            Flag::FILL_NO_RED
        };
        log::debug!(
            "fill {:?}: b/w 0x{:02X}, red 0x{:02X}",
            color,
            black_fill,
            red_fill
        );

        let bw_size = self.bw_bufsize();
        let red_size = self.red_bufsize();
        let bus = self.interface.bus();
        self.storage.fill(bus, 0, bw_size, black_fill)?;
        self.storage.fill(bus, bw_size, red_size, red_fill)
    }
}
