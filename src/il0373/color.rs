//! Pixel colors understood by the tri-color panel
use embedded_graphics::pixelcolor::{PixelColor, Rgb888, RgbColor};

/// Pixel color written into the bit-planes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    /// Clears the black/white bit
    Black,
    /// Sets the black/white bit
    #[default]
    White,
    /// Flips the black/white bit
    Inverse,
    /// Clears the red bit
    Red,
    /// Grayscale shade, ignored by this controller
    Dark,
    /// Grayscale shade, ignored by this controller
    Light,
}

impl Color {
    /// Map an RGB pixel the way bulk image loads do: pure red, pure black, everything else white
    pub fn from_rgb(rgb: Rgb888) -> Self {
        match (rgb.r(), rgb.g(), rgb.b()) {
            (0xFF, 0x00, 0x00) => Color::Red,
            (0x00, 0x00, 0x00) => Color::Black,
            _ => Color::White,
        }
    }

    /// Lands in the red plane
    pub fn is_red(self) -> bool {
        self == Color::Red
    }
}

impl PixelColor for Color {
    type Raw = ();
}

impl From<Rgb888> for Color {
    fn from(rgb: Rgb888) -> Self {
        Color::from_rgb(rgb)
    }
}
