/// Parameter bytes sent along with the IL0373 commands.
///
/// Values match the Adafruit tri-color breakouts; other panels built on the
/// same controller may need different booster or VCOM settings.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Power Setting (0x01): internal VDS/VDG, VGH/VGL 20V, VDH/VDL 11V, VDHR 4.2V
    pub const POWER_SETTING: [u8; 5] = [0x03, 0x00, 0x2B, 0x2B, 0x09];

    // Booster Soft Start (0x06), phases A/B/C
    pub const BOOSTER_SOFT_START: [u8; 3] = [0x17, 0x17, 0x17];

    // Panel Setting (0x00): resolution from register, LUT from OTP, tri-color, scan up, shift right
    pub const PANEL_SETTING_TRICOLOR: u8 = 0xCF;

    // VCOM and Data Interval (0x50)
    pub const CDI_REFRESH: u8 = 0x37; // border follows LUT while refreshing
    pub const CDI_POWER_DOWN: u8 = 0x17; // floating border before power off

    // PLL Control (0x30): 100Hz frame rate
    pub const PLL_100HZ: u8 = 0x29;

    // VCM DC Setting (0x82)
    pub const VCM_DC_REFRESH: u8 = 0x0A; // -0.9V
    pub const VCM_DC_POWER_DOWN: u8 = 0x00;

    // Deep Sleep (0x07) check code, anything else is ignored by the controller
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

    // Plane fill bytes, a set bit means white (b/w plane) or no red (red plane)
    pub const FILL_WHITE: u8 = 0xFF;
    pub const FILL_BLACK: u8 = 0x00;
    pub const FILL_NO_RED: u8 = 0xFF;
    pub const FILL_RED: u8 = 0x00;
}
