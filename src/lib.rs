//! Driver for IL0373 tri-color e-paper panels.
//!
//! The black/white and red bit-planes live either in local memory or in an
//! external serial SRAM sharing the SPI bus with the panel. Pixels are set one
//! at a time, then [`Il0373::display`] streams both planes to the controller
//! and refreshes the glass.
//!
//! ```ignore
//! let pins = Pins::new(busy, dc, rst, epd_cs);
//! let mut epd = Il0373::with_sram(spi, pins, sram_cs, delay, Config::default())?;
//! epd.fill(Color::White)?;
//! epd.fill_rect(10, 10, 40, 20, Color::Red)?;
//! epd.display()?;
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

mod il0373;

pub use crate::il0373::color::Color;
pub use crate::il0373::config::{Config, HEIGHT, WIDTH};
pub use crate::il0373::driver::Il0373;
pub use crate::il0373::error::{DisplayError, Error, Unsupported};
pub use crate::il0373::graphics::Canvas;
pub use crate::il0373::interface::{DisplayInterface, Unwired};
pub use crate::il0373::pins::Pins;
pub use crate::il0373::plane::{pixel_address, PlaneStorage};
pub use crate::il0373::sram::McpSram;

/// Everything needed to drive the panel and draw on it
pub mod prelude {
    pub use crate::{Canvas, Color, Config, Il0373, Pins};
    pub use embedded_graphics::prelude::{DrawTarget, OriginDimensions};
}
