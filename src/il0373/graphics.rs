//! Graphics Support
//!
//! [`Canvas`] is the minimal drawing surface of the panel: everything is built
//! from a single `draw_pixel`. Lines, blits, scrolling and text belong to
//! [`embedded_graphics`], which can draw on the driver through its
//! [`DrawTarget`] implementation.
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::Pixel;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::il0373::color::Color;
use crate::il0373::driver::Il0373;
use crate::il0373::error::{Error, Unsupported};

/// Drawing surface built on a single pixel primitive
pub trait Canvas {
    /// Error of the pixel primitive
    type Error: From<Unsupported>;

    /// Width in pixels
    fn width(&self) -> u16;

    /// Height in pixels
    fn height(&self) -> u16;

    /// Set one pixel, coordinates are already inside the surface
    fn draw_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), Self::Error>;

    /// Paint the whole surface
    fn fill(&mut self, color: Color) -> Result<(), Self::Error> {
        let (width, height) = (i32::from(self.width()), i32::from(self.height()));
        self.fill_rect(0, 0, width, height, color)
    }

    /// Paint a rectangle, clipped to the surface
    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), Self::Error> {
        let (surface_w, surface_h) = (i32::from(self.width()), i32::from(self.height()));
        if width < 1 || height < 1 {
            return Ok(());
        }
        let x_end = surface_w.min(x.saturating_add(width));
        let y_end = surface_h.min(y.saturating_add(height));
        if x_end <= 0 || y_end <= 0 || x >= surface_w || y >= surface_h {
            return Ok(());
        }

        for px in x.max(0)..x_end {
            for py in y.max(0)..y_end {
                self.draw_pixel(px as u16, py as u16, color)?;
            }
        }
        Ok(())
    }

    /// Set one pixel, anything outside the surface is ignored
    fn pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), Self::Error> {
        if x < 0 || y < 0 || x >= i32::from(self.width()) || y >= i32::from(self.height()) {
            return Ok(());
        }
        self.draw_pixel(x as u16, y as u16, color)
    }

    /// Horizontal line
    fn hline(&mut self, x: i32, y: i32, width: i32, color: Color) -> Result<(), Self::Error> {
        self.fill_rect(x, y, width, 1, color)
    }

    /// Vertical line
    fn vline(&mut self, x: i32, y: i32, height: i32, color: Color) -> Result<(), Self::Error> {
        self.fill_rect(x, y, 1, height, color)
    }

    /// Rectangle outline with inclusive edges.
    ///
    /// The outline covers columns `x` and `x + width - 1` and rows `y` and
    /// `y + height - 1`, so a `width` × `height` rectangle touches exactly
    /// `width` × `height` pixels of bounding box.
    fn rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), Self::Error> {
        if width < 1 || height < 1 {
            return Ok(());
        }
        self.hline(x, y, width, color)?;
        self.hline(x, y + height - 1, width, color)?;
        self.vline(x, y, height, color)?;
        self.vline(x + width - 1, y, height, color)
    }

    /// Use `embedded_graphics::primitives::Line` instead
    fn line(
        &mut self,
        _x0: i32,
        _y0: i32,
        _x1: i32,
        _y1: i32,
        _color: Color,
    ) -> Result<(), Self::Error> {
        Err(Unsupported("line").into())
    }

    /// Use `embedded_graphics::image::Image` instead
    fn blit(&mut self, _x: i32, _y: i32, _source: &[u8]) -> Result<(), Self::Error> {
        Err(Unsupported("blit").into())
    }

    /// Not supported on e-paper
    fn scroll(&mut self, _dx: i32, _dy: i32) -> Result<(), Self::Error> {
        Err(Unsupported("scroll").into())
    }

    /// Use `embedded_graphics::text::Text` instead
    fn text(&mut self, _text: &str, _x: i32, _y: i32, _color: Color) -> Result<(), Self::Error> {
        Err(Unsupported("text").into())
    }
}

impl<SPI, BSY, DC, RST, CS, SRCS, DELAY> OriginDimensions
    for Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY>
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.config().width), u32::from(self.config().height))
    }
}

impl<SPI, BSY, DC, RST, CS, SRCS, DELAY> DrawTarget for Il0373<SPI, BSY, DC, RST, CS, SRCS, DELAY>
where
    SPI: SpiBus,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    SRCS: OutputPin,
    DELAY: DelayNs,
{
    type Color = Color;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            Canvas::pixel(self, point.x, point.y, color)?;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Canvas::fill(self, color)
    }
}
