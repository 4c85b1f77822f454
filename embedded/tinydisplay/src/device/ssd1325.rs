//! SSD1325 4-bit grayscale OLED (128x64)
//!
//! GDRAM columns hold two pixels each (even pixel in the low nibble). Both
//! modes share the pair packing: pixels are buffered until the odd half or
//! the window's last column arrives.

use super::{
    page_end, send_commands, window_end, AdapterInfo, ColorDepth, ControllerKind, DeviceAdapter,
    LcdMode,
};
use crate::hal::Interface;

mod cmd {
    pub const SET_COLUMN: u8 = 0x15;
    pub const SET_ROW: u8 = 0x75;
    pub const REMAP: u8 = 0xA0;
    /// Remap value with vertical address increment
    pub const REMAP_VERTICAL: u8 = 0x04;
    pub const REMAP_COM_SPLIT: u8 = 0x10;
}

use cmd::*;

#[rustfmt::skip]
static INIT_128X64: &[u8] = &[
    0xAE,                   // display off
    0xB3, 0x91,             // clock
    0xA8, 0x3F,             // multiplex 64
    0xA2, 0x00,             // display offset
    0xA1, 0x00,             // start line
    0xAD, 0x02,             // master configuration
    REMAP, 0x40 | REMAP_COM_SPLIT | REMAP_VERTICAL | 0x02 | 0x01,
    0x86,                   // full current
    0x81, 0x70,             // contrast
    0xB2, 0x51,             // row period
    0xB1, 0x55,             // phase length
    0xBC, 0x10,             // precharge
    0xBE, 0x1C,             // VCOMH
    0xA4,                   // normal display
];

pub struct Ssd1325<I: Interface> {
    intf: I,
    mode: LcdMode,
    color: u16,
    column: u16,
    page: u16,
    width: u16,
    /// Columns in the open window
    span: u16,
    pos: u16,
    left: u8,
}

impl<I: Interface> Ssd1325<I> {
    pub const WIDTH: u16 = 128;
    pub const HEIGHT: u16 = 64;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            mode: LcdMode::Compatible,
            color: 0x0F,
            column: 0,
            page: 0,
            width: 0,
            span: 0,
            pos: 0,
            left: 0,
        }
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_128X64
    }

    fn open_window(&mut self, x: u16, rx: u16, y1: u16, y2: u16) {
        self.span = rx - x + 1;
        self.pos = x;
        self.left = 0;
        self.intf.start();
        self.intf.command_mode();
        self.intf.send_buffer(&[
            SET_COLUMN,
            (x / 2) as u8,
            (rx / 2) as u8,
            SET_ROW,
            y1 as u8,
            y2 as u8,
        ]);
        self.intf.data_mode();
    }

    /// Advances the pair cursor; returns true if the byte must go out now
    fn step(&mut self) -> bool {
        let last = self.column + self.span - 1;
        let flush = self.pos & 1 == 1 || self.pos == last;
        self.pos = if self.pos == last { self.column } else { self.pos + 1 };
        flush
    }
}

impl<I: Interface> DeviceAdapter for Ssd1325<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Ssd1325,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            depth: ColorDepth::Gray4,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("ssd1325: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_commands(&mut self.intf, INIT_128X64);
        self.mode = LcdMode::Compatible;
    }

    fn open_block(&mut self, x: u16, y: u16, w: u16) {
        let rx = window_end(x, w, Self::WIDTH);
        self.column = x;
        self.page = y;
        self.width = w;
        match self.mode {
            LcdMode::Compatible => self.open_window(x, rx, y << 3, page_end(y, Self::HEIGHT)),
            LcdMode::Normal => self.open_window(x, rx, y, Self::HEIGHT - 1),
        }
    }

    fn next_page(&mut self) {
        if self.mode == LcdMode::Compatible {
            self.intf.stop();
            self.open_block(self.column, self.page + 1, self.width);
        }
    }

    /// Column pairs become 8 bytes, one per row
    fn send_pixels1(&mut self, bits: u8) {
        let mut right = bits;
        if self.pos & 1 == 0 {
            self.left = bits;
            right = 0;
        }
        if self.step() {
            let level = (self.color & 0x0F) as u8;
            let mut left = self.left;
            for _ in 0..8 {
                let lo = if left & 1 != 0 { level } else { 0 };
                let hi = if right & 1 != 0 { level } else { 0 };
                self.intf.send(lo | (hi << 4));
                left >>= 1;
                right >>= 1;
            }
            self.left = 0;
        }
    }

    /// One gray level; pairs are packed before they go out
    fn send_pixels8(&mut self, pixel: u8) {
        let level = pixel & 0x0F;
        let mut right = level;
        if self.pos & 1 == 0 {
            self.left = level;
            right = 0;
        }
        if self.step() {
            self.intf.send(self.left | (right << 4));
            self.left = 0;
        }
    }

    fn send_pixels16(&mut self, pixel: u16) {
        let gray = crate::color::Color::from_rgb565(pixel).to_gray4();
        self.send_pixels8(gray);
    }

    fn mode(&self) -> LcdMode {
        self.mode
    }

    fn set_mode(&mut self, mode: LcdMode) {
        log::debug!("ssd1325: {} mode", mode);
        self.mode = mode;
        let vertical = if mode == LcdMode::Compatible { REMAP_VERTICAL } else { 0 };
        send_commands(&mut self.intf, &[REMAP, REMAP_COM_SPLIT | vertical]);
    }

    fn set_color(&mut self, color: u16) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::RecordingInterface;
    use hex_literal::hex;

    #[test]
    fn test_compat_pair_packing() {
        let mut oled = Ssd1325::new(RecordingInterface::new());
        {
            let mut block = oled.set_block(4, 0, 3);
            block.send_pixels1(0b0000_0001);
            block.send_pixels1(0b0000_0011);
            block.send_pixels1(0b1000_0000);
        }
        let intf = oled.release();
        assert_eq!(intf.commands(), hex!("15 02 03 75 00 07").to_vec());
        assert_eq!(
            intf.data(),
            hex!("ff f0 00 00 00 00 00 00" "00 00 00 00 00 00 00 0f").to_vec()
        );
    }

    #[test]
    fn test_set_mode_remap() {
        let mut oled = Ssd1325::new(RecordingInterface::new());
        oled.set_mode(LcdMode::Normal);
        oled.set_mode(LcdMode::Compatible);
        assert_eq!(oled.release().commands(), hex!("a0 10 a0 14").to_vec());
    }

    #[test]
    fn test_normal_mode_packs_levels() {
        let mut oled = Ssd1325::new(RecordingInterface::new());
        oled.set_mode(LcdMode::Normal);
        oled.interface().clear();
        {
            let mut block = oled.set_block(0, 10, 3);
            for level in [0x1, 0x2, 0x3, 0x4, 0x5, 0x6] {
                block.send_pixels8(level);
            }
        }
        let intf = oled.release();
        assert_eq!(intf.commands(), hex!("15 00 01 75 0a 3f").to_vec());
        // 3-pixel rows: (1,2) (3,-) then (4,5) (6,-)
        assert_eq!(intf.data(), hex!("21 03 54 06").to_vec());
    }

    #[test]
    fn test_init_leaves_compatible_mode() {
        let mut oled = Ssd1325::new(RecordingInterface::new());
        oled.init();
        assert_eq!(oled.mode(), LcdMode::Compatible);
        let intf = oled.release();
        assert!(intf.is_balanced());
        assert_eq!(intf.commands()[12], 0x57);
    }
}
