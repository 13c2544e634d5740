//! Control lines of the panel
//!
//! The SPI clock and data lines belong to the bus; these are the pins the
//! driver toggles itself. The SRAM chip select is handed to [`crate::McpSram`].

/// Control pins of the IL0373 panel
pub struct Pins<BSY, DC, RST, CS> {
    /// Busy status input, high when the controller is ready. `None` makes the driver sleep instead
    pub busy: Option<BSY>,
    /// Data/Command control pin (High for data, Low for command)
    pub dc: DC,
    /// Reset pin, active low. `None` skips the reset pulse
    pub rst: Option<RST>,
    /// Chip select of the panel, active low
    pub cs: CS,
}

impl<BSY, DC, RST, CS> Pins<BSY, DC, RST, CS> {
    /// All four control lines wired
    pub fn new(busy: BSY, dc: DC, rst: RST, cs: CS) -> Self {
        Pins {
            busy: Some(busy),
            dc,
            rst: Some(rst),
            cs,
        }
    }
}
