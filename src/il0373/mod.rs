//! IL0373 tri-color ePaper Display Driver
//!
//! Used in the [Adafruit 1.54" Tri-Color eInk breakout](https://www.adafruit.com/product/3625),
//! which puts a 23K640 serial SRAM on the same SPI bus as the panel.
//!
//! ### Usage
//! The driver keeps two bit-planes, black/white and red, either in local
//! memory or in the SRAM. To display something you:
//!
//! 1. create the driver with [`driver::Il0373::with_sram`] or
//!    [`driver::Il0373::with_local_buffer`]
//! 1. draw onto the planes, with the [`graphics::Canvas`] methods or
//!    with [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. push the planes and refresh using [`driver::Il0373::display`]
//!
//! A refresh takes several seconds and the panel should not be refreshed
//! more often than every few minutes.

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod graphics;
pub mod interface;
pub mod pins;
pub mod plane;
pub mod sram;

mod cmd;
mod flag;

#[cfg(test)]
mod test_support;
