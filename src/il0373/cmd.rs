pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    // Power
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_OFF_SEQUENCE: u8 = 0x03;
    pub const POWER_ON: u8 = 0x04;
    pub const POWER_ON_MEASURE: u8 = 0x05;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;

    // Data transfer
    pub const DTM1: u8 = 0x10;
    pub const DATA_STOP: u8 = 0x11;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const DTM2: u8 = 0x13;
    pub const PDTM1: u8 = 0x14;
    pub const PDTM2: u8 = 0x15;
    pub const PDRF: u8 = 0x16;

    // Waveform LUTs
    pub const LUT1: u8 = 0x20;
    pub const LUTWW: u8 = 0x21;
    pub const LUTBW: u8 = 0x22;
    pub const LUTWB: u8 = 0x23;
    pub const LUTBB: u8 = 0x24;

    // Timing
    pub const PLL: u8 = 0x30;
    pub const CDI: u8 = 0x50;
    pub const RESOLUTION: u8 = 0x61;
    pub const VCM_DC_SETTING: u8 = 0x82;
}

/*
Full refresh, BUSY is polled after 0x04 and 0x12:
0x04 - Power On
0x00 - Panel Setting
0x50 - VCOM and Data Interval (CDI)
0x30 - PLL Control
0x61 - Resolution
0x82 - VCM DC Setting
0x10 - Data Start Transmission 1 (black/white)
0x13 - Data Start Transmission 2 (red)
0x12 - Display Refresh
0x50 - CDI, floating border
0x82 - VCM DC Setting, 0V
0x02 - Power Off
*/
