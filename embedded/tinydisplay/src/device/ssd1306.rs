//! SSD1306 monochrome OLED (128x64, 128x32)
//!
//! Runs in horizontal addressing mode: COLUMNADDR/PAGEADDR define a window
//! and the controller wraps to the next page by itself, so `next_page` has
//! nothing to do.

use super::{send_commands, window_end, AdapterInfo, ColorDepth, ControllerKind, DeviceAdapter};
use crate::hal::Interface;

/// SSD1306 command set
#[allow(dead_code)]
pub mod cmd {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE: u8 = 0xB0;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;

    pub const HORIZONTAL_ADDRESSING: u8 = 0x00;
}

use cmd::*;

#[rustfmt::skip]
static INIT_128X64: &[u8] = &[
    DISPLAY_OFF,
    MEMORY_MODE, HORIZONTAL_ADDRESSING,
    COM_SCAN_DEC,
    SET_START_LINE,
    SET_CONTRAST, 0x7F,
    SEG_REMAP | 0x01,
    NORMAL_DISPLAY,
    SET_MULTIPLEX, 63,
    SET_DISPLAY_OFFSET, 0x00,
    SET_DISPLAY_CLOCK_DIV, 0x80,
    SET_PRECHARGE, 0x22,
    SET_COM_PINS, 0x12,
    SET_VCOM_DETECT, 0x20,
    CHARGE_PUMP, 0x14,
    DISPLAY_ALL_ON_RESUME,
    DISPLAY_ON,
];

#[rustfmt::skip]
static INIT_128X32: &[u8] = &[
    DISPLAY_OFF,
    SET_DISPLAY_CLOCK_DIV, 0x80,
    SET_MULTIPLEX, 31,
    SET_DISPLAY_OFFSET, 0x00,
    SET_START_LINE,
    CHARGE_PUMP, 0x14,
    SEG_REMAP | 0x01,
    COM_SCAN_DEC,
    SET_COM_PINS, 0x02,
    SET_CONTRAST, 0x7F,
    SET_PRECHARGE, 0x22,
    SET_VCOM_DETECT, 0x40,
    MEMORY_MODE, HORIZONTAL_ADDRESSING,
    DISPLAY_ALL_ON_RESUME,
    NORMAL_DISPLAY,
    DISPLAY_ON,
];

/// Panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ssd1306Variant {
    #[default]
    W128H64,
    W128H32,
}

impl Ssd1306Variant {
    pub const fn height(&self) -> u16 {
        match self {
            Ssd1306Variant::W128H64 => 64,
            Ssd1306Variant::W128H32 => 32,
        }
    }

    pub fn init_table(&self) -> &'static [u8] {
        match self {
            Ssd1306Variant::W128H64 => INIT_128X64,
            Ssd1306Variant::W128H32 => INIT_128X32,
        }
    }
}

pub struct Ssd1306<I: Interface> {
    intf: I,
    variant: Ssd1306Variant,
}

impl<I: Interface> Ssd1306<I> {
    pub const WIDTH: u16 = 128;

    pub fn new(intf: I, variant: Ssd1306Variant) -> Self {
        Self { intf, variant }
    }

    pub fn variant(&self) -> Ssd1306Variant {
        self.variant
    }

    pub fn display_on(&mut self) {
        send_commands(&mut self.intf, &[DISPLAY_ON]);
    }

    pub fn display_off(&mut self) {
        send_commands(&mut self.intf, &[DISPLAY_OFF]);
    }

    pub fn set_contrast(&mut self, contrast: u8) {
        send_commands(&mut self.intf, &[SET_CONTRAST, contrast]);
    }

    /// Hardware inversion of the whole panel
    pub fn invert_display(&mut self, inverted: bool) {
        let command = if inverted { INVERT_DISPLAY } else { NORMAL_DISPLAY };
        send_commands(&mut self.intf, &[command]);
    }

    pub fn release(self) -> I {
        self.intf
    }
}

impl<I: Interface> DeviceAdapter for Ssd1306<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Ssd1306,
            width: Self::WIDTH,
            height: self.variant.height(),
            depth: ColorDepth::Mono1,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("ssd1306: init {}x{}", Self::WIDTH, self.variant.height());
        send_commands(&mut self.intf, self.variant.init_table());
    }

    fn open_block(&mut self, x: u16, y: u16, w: u16) {
        let rx = window_end(x, w, Self::WIDTH);
        let last_page = (self.variant.height() >> 3) - 1;
        self.intf.start();
        self.intf.command_mode();
        self.intf
            .send_buffer(&[COLUMN_ADDR, x as u8, rx as u8, PAGE_ADDR, y as u8, last_page as u8]);
        self.intf.data_mode();
    }

    fn next_page(&mut self) {}

    fn send_pixels1(&mut self, bits: u8) {
        self.intf.send(bits);
    }

    fn send_pixels_buffer1(&mut self, bytes: &[u8]) {
        self.intf.send_buffer(bytes);
    }
}

/// Rebuilds page-ordered GDRAM from a recorded trace by replaying every
/// COLUMNADDR/PAGEADDR window and the data sent into it
#[cfg(test)]
pub(crate) fn replay_gdram(intf: &crate::hal::mock::RecordingInterface, height: u16) -> Vec<u8> {
    use crate::hal::mock::WireEvent;

    let width = Ssd1306::<crate::hal::mock::RecordingInterface>::WIDTH as usize;
    let pages = (height as usize + 7) / 8;
    let mut gdram = vec![0u8; width * pages];
    for session in intf.sessions() {
        let mut commands = Vec::new();
        let mut data = Vec::new();
        for event in session {
            match event {
                WireEvent::Command(b) => commands.push(b),
                WireEvent::Data(b) => data.push(b),
                _ => {}
            }
        }
        let [COLUMN_ADDR, x, rx, PAGE_ADDR, page, last] = commands[..] else {
            continue;
        };
        let (x, cols) = (x as usize, rx.saturating_sub(x) as usize + 1);
        for (i, byte) in data.into_iter().enumerate() {
            let p = page as usize + i / cols;
            if p > last as usize {
                break;
            }
            gdram[p * width + x + i % cols] = byte;
        }
    }
    gdram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{RecordingInterface, WireEvent};
    use hex_literal::hex;

    #[test]
    fn test_set_block_trace() {
        let mut oled = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64);
        {
            let mut block = oled.set_block(10, 0, 5);
            block.send_pixels1(0xAA);
        }
        let intf = oled.release();
        assert_eq!(intf.commands(), hex!("21 0a 0e 22 00 07").to_vec());
        assert_eq!(intf.data(), vec![0xAA]);
        assert_eq!(intf.starts(), 1);
        assert_eq!(intf.stops(), 1);
        assert_eq!(intf.events().last(), Some(&WireEvent::Stop));
    }

    #[test]
    fn test_full_width_window() {
        let mut oled = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H32);
        drop(oled.set_block(0, 1, 0));
        assert_eq!(oled.release().commands(), hex!("21 00 7f 22 01 03").to_vec());
    }

    #[test]
    fn test_init_is_one_command_session() {
        let mut oled = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64);
        oled.init();
        let intf = oled.release();
        assert!(intf.is_balanced());
        assert_eq!(intf.starts(), 1);
        assert_eq!(intf.commands(), INIT_128X64.to_vec());
        assert!(intf.data().is_empty());
    }

    #[test]
    fn test_next_page_keeps_session() {
        let mut oled = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64);
        {
            let mut block = oled.set_block(0, 0, 2);
            block.send_pixels_buffer1(&[1, 2]);
            block.next_page();
            block.send_pixels_buffer1(&[3, 4]);
        }
        let intf = oled.release();
        assert_eq!(intf.starts(), 1);
        assert_eq!(intf.data(), vec![1, 2, 3, 4]);
    }
}
