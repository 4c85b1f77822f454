//! PCD8544 monochrome LCD (84x48, Nokia 5110)
//!
//! Horizontal addressing wraps across banks on its own only for full-width
//! windows, so `next_page` re-addresses. One-column windows switch to
//! vertical addressing and never need a page step.

use super::{send_commands, AdapterInfo, ColorDepth, ControllerKind, DeviceAdapter};
use crate::hal::Interface;

mod cmd {
    pub const FUNCTION_SET: u8 = 0x20;
    pub const VERTICAL_ADDRESSING: u8 = 0x02;
    pub const EXTENDED_INSTRUCTION: u8 = 0x01;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_NORMAL: u8 = 0x04;
    pub const SET_TEMP: u8 = 0x04;
    pub const SET_BIAS: u8 = 0x10;
    pub const SET_Y: u8 = 0x40;
    pub const SET_X: u8 = 0x80;
    pub const SET_VOP: u8 = 0x80;
}

use cmd::*;

#[rustfmt::skip]
static INIT_84X48: &[u8] = &[
    FUNCTION_SET | EXTENDED_INSTRUCTION,
    SET_VOP | 0x16,
    SET_TEMP,
    SET_BIAS | 0x04,
    FUNCTION_SET,
    DISPLAY_CONTROL | DISPLAY_NORMAL,
];

pub struct Pcd8544<I: Interface> {
    intf: I,
    column: u16,
    page: u16,
    width: u16,
}

impl<I: Interface> Pcd8544<I> {
    pub const WIDTH: u16 = 84;
    pub const HEIGHT: u16 = 48;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            column: 0,
            page: 0,
            width: 0,
        }
    }

    /// Operating voltage (contrast), 7 bits
    pub fn set_contrast(&mut self, vop: u8) {
        send_commands(
            &mut self.intf,
            &[FUNCTION_SET | EXTENDED_INSTRUCTION, SET_VOP | (vop & 0x7F), FUNCTION_SET],
        );
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_84X48
    }
}

impl<I: Interface> DeviceAdapter for Pcd8544<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Pcd8544,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            depth: ColorDepth::Mono1,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("pcd8544: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_commands(&mut self.intf, INIT_84X48);
    }

    fn open_block(&mut self, x: u16, y: u16, w: u16) {
        self.column = x;
        self.page = y;
        self.width = w;
        let addressing = if w == 1 {
            FUNCTION_SET | VERTICAL_ADDRESSING
        } else {
            FUNCTION_SET
        };
        self.intf.start();
        self.intf.command_mode();
        self.intf
            .send_buffer(&[addressing, SET_X | x as u8, SET_Y | y as u8]);
        self.intf.data_mode();
    }

    fn next_page(&mut self) {
        if self.width != 1 {
            self.intf.stop();
            self.open_block(self.column, self.page + 1, self.width);
        }
    }

    fn send_pixels1(&mut self, bits: u8) {
        self.intf.send(bits);
    }

    fn send_pixels_buffer1(&mut self, bytes: &[u8]) {
        self.intf.send_buffer(bytes);
    }
}
