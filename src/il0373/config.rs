//! Panel configuration

/// Display width of the Adafruit 1.54" tri-color panel, pixels horizontally
pub const WIDTH: u16 = 152;

/// Display height of the Adafruit 1.54" tri-color panel, pixels vertically
pub const HEIGHT: u16 = 152;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Driver configuration, chosen once at construction
pub struct Config {
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// Give up waiting on the BUSY line after this many milliseconds.
    ///
    /// `None` waits forever, which is what the panel needs when a refresh runs long.
    pub busy_timeout_ms: Option<u32>,
    /// Pulse the reset line during `begin`
    pub reset_on_begin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            busy_timeout_ms: None,
            reset_on_begin: true,
        }
    }
}

impl Config {
    /// Set the panel geometry
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Bound every BUSY wait
    pub fn with_busy_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.busy_timeout_ms = Some(timeout_ms);
        self
    }

    /// Skip the hardware reset pulse in `begin`
    pub fn without_reset(mut self) -> Self {
        self.reset_on_begin = false;
        self
    }

    /// Bytes in one bit-plane
    pub fn plane_size(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) / 8
    }

    /// Pixels pack into whole bytes
    pub(crate) fn is_packed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && (usize::from(self.width) * usize::from(self.height)) % 8 == 0
    }
}
