//! SH1106 monochrome OLED (128x64)
//!
//! Page addressing only: the RAM is 132 columns wide with the visible area
//! starting at column 2, and the page register does not auto-advance.

use super::ssd1306::cmd::*;
use super::{send_commands, AdapterInfo, ColorDepth, ControllerKind, DeviceAdapter};
use crate::hal::Interface;

/// Offset of the first visible RAM column
const COLUMN_OFFSET: u16 = 2;

#[rustfmt::skip]
static INIT_128X64: &[u8] = &[
    DISPLAY_OFF,
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

pub struct Sh1106<I: Interface> {
    intf: I,
    column: u16,
    page: u16,
}

impl<I: Interface> Sh1106<I> {
    pub const WIDTH: u16 = 128;
    pub const HEIGHT: u16 = 64;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            column: 0,
            page: 0,
        }
    }

    pub fn set_contrast(&mut self, contrast: u8) {
        send_commands(&mut self.intf, &[SET_CONTRAST, contrast]);
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_128X64
    }
}

impl<I: Interface> DeviceAdapter for Sh1106<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Sh1106,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            depth: ColorDepth::Mono1,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("sh1106: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_commands(&mut self.intf, INIT_128X64);
    }

    fn open_block(&mut self, x: u16, y: u16, _w: u16) {
        self.column = x;
        self.page = y;
        let col = x + COLUMN_OFFSET;
        self.intf.start();
        self.intf.command_mode();
        self.intf.send_buffer(&[
            SET_PAGE | y as u8,
            SET_HIGH_COLUMN | (col >> 4) as u8,
            SET_LOW_COLUMN | (col & 0x0F) as u8,
        ]);
        self.intf.data_mode();
    }

    fn next_page(&mut self) {
        self.intf.stop();
        self.open_block(self.column, self.page + 1, 0);
    }

    fn send_pixels1(&mut self, bits: u8) {
        self.intf.send(bits);
    }

    fn send_pixels_buffer1(&mut self, bytes: &[u8]) {
        self.intf.send_buffer(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{RecordingInterface, WireEvent};

    #[test]
    fn test_column_offset_and_page_reopen() {
        let mut oled = Sh1106::new(RecordingInterface::new());
        {
            let mut block = oled.set_block(30, 2, 4);
            block.send_pixels1(0x0F);
            block.next_page();
            block.send_pixels1(0xF0);
        }
        let intf = oled.release();
        assert!(intf.is_balanced());
        assert_eq!(
            intf.sessions(),
            vec![
                vec![
                    WireEvent::Command(0xB2),
                    WireEvent::Command(0x12),
                    WireEvent::Command(0x00),
                    WireEvent::Data(0x0F),
                ],
                vec![
                    WireEvent::Command(0xB3),
                    WireEvent::Command(0x12),
                    WireEvent::Command(0x00),
                    WireEvent::Data(0xF0),
                ],
            ]
        );
    }
}
