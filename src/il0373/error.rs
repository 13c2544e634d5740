//! Errors returned by the driver
use core::fmt;

pub use display_interface::DisplayError;

/// Everything that can go wrong while talking to the panel or its SRAM.
#[derive(Debug, Clone)]
pub enum Error {
    /// SPI bus or control pin failure (data/command, chip select, reset)
    Interface(DisplayError),
    /// Reading the BUSY line failed
    BusyPin,
    /// The BUSY line did not signal ready within the configured timeout
    BusyTimeout {
        /// Milliseconds waited before giving up
        waited_ms: u32,
    },
    /// Width and height do not pack into whole bytes, or the planes do not fit the SRAM
    InvalidGeometry {
        /// Panel width in pixels
        width: u16,
        /// Panel height in pixels
        height: u16,
    },
    /// Image handed to a bulk load has the wrong size or color mode
    InvalidImage {
        /// Width the image must have
        expected_width: u32,
        /// Height the image must have
        expected_height: u32,
        /// What was wrong with it
        reason: &'static str,
    },
    /// Drawing operation left to a higher level graphics library
    Unsupported(&'static str),
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Interface(e)
    }
}

impl From<Unsupported> for Error {
    fn from(e: Unsupported) -> Self {
        Error::Unsupported(e.0)
    }
}

/// Marker error for drawing operations the canvas does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsupported(pub &'static str);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "display interface error: {:?}", e),
            Error::BusyPin => write!(f, "could not read the BUSY pin"),
            Error::BusyTimeout { waited_ms } => {
                write!(f, "display stayed busy for {} ms", waited_ms)
            }
            Error::InvalidGeometry { width, height } => write!(
                f,
                "{}x{} panel does not pack into whole bytes or fit the SRAM",
                width, height
            ),
            Error::InvalidImage {
                expected_width,
                expected_height,
                reason,
            } => write!(
                f,
                "{}: image must be RGB and {}x{}",
                reason, expected_width, expected_height
            ),
            Error::Unsupported(op) => write!(f, "`{}` is not implemented", op),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
