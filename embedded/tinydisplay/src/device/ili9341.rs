//! ILI9341 TFT (240x320, 16-bit RGB565)
//!
//! Compatible mode exchanges row and column addressing through MADCTL so
//! that GDRAM advances down a page column by column, the way page-oriented
//! OLEDs do. Normal mode uses the panel's native row-major order.

use super::{
    command_args, expand_bits16, send_init_sequence, AdapterInfo, ColorDepth, ControllerKind,
    DeviceAdapter, LcdMode, CMD_ARG,
};
use crate::color::rgb332_to_rgb565;
use crate::hal::Interface;

/// ILI9341 command set
#[allow(dead_code)]
pub mod cmd {
    pub const SOFT_RESET: u8 = 0x01;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const GAMMA_SET: u8 = 0x26;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR: u8 = 0x2A;
    pub const PAGE_ADDR: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
    pub const POWER_CONTROL1: u8 = 0xC0;
    pub const POWER_CONTROL2: u8 = 0xC1;
    pub const VCOM_CONTROL1: u8 = 0xC5;
    pub const VCOM_CONTROL2: u8 = 0xC7;
    pub const POSITIVE_GAMMA: u8 = 0xE0;
    pub const NEGATIVE_GAMMA: u8 = 0xE1;
    pub const GAMMA_ENABLE: u8 = 0xF2;

    /// MADCTL bit selecting BGR panel order
    pub const MADCTL_BGR: u8 = 0x08;
}

use cmd::*;

#[rustfmt::skip]
static INIT_240X320: &[u8] = &[
    SOFT_RESET,
    SLEEP_OUT,
    PIXEL_FORMAT, CMD_ARG, 0x05,
    GAMMA_SET, CMD_ARG, 0x04,
    GAMMA_ENABLE, CMD_ARG, 0x01,
    POSITIVE_GAMMA,
        CMD_ARG, 0x3F, CMD_ARG, 0x25, CMD_ARG, 0x1C, CMD_ARG, 0x1E, CMD_ARG, 0x20,
        CMD_ARG, 0x12, CMD_ARG, 0x2A, CMD_ARG, 0x90, CMD_ARG, 0x24, CMD_ARG, 0x11,
        CMD_ARG, 0x00, CMD_ARG, 0x00, CMD_ARG, 0x00, CMD_ARG, 0x00, CMD_ARG, 0x00,
    NEGATIVE_GAMMA,
        CMD_ARG, 0x20, CMD_ARG, 0x20, CMD_ARG, 0x20, CMD_ARG, 0x20, CMD_ARG, 0x05,
        CMD_ARG, 0x00, CMD_ARG, 0x15, CMD_ARG, 0xA7, CMD_ARG, 0x3D, CMD_ARG, 0x18,
        CMD_ARG, 0x25, CMD_ARG, 0x2A, CMD_ARG, 0x2B, CMD_ARG, 0x2B, CMD_ARG, 0x3A,
    POWER_CONTROL1, CMD_ARG, 0x0A, CMD_ARG, 0x02,
    POWER_CONTROL2, CMD_ARG, 0x02,
    VCOM_CONTROL1, CMD_ARG, 0x50, CMD_ARG, 0x5B,
    VCOM_CONTROL2, CMD_ARG, 0x40,
    MADCTL, CMD_ARG, 0xA0,
    DISPLAY_ON,
];

/// MADCTL for each (normal-mode flag, rotation) pair
const MADCTL_TABLE: [u8; 8] = [0xA0, 0xD0, 0x60, 0x00, 0x84, 0xE0, 0x54, 0x20];

pub struct Ili9341<I: Interface> {
    intf: I,
    mode: LcdMode,
    rotation: u8,
    width: u16,
    height: u16,
    color: u16,
    column: u16,
    page: u16,
    block_width: u16,
}

impl<I: Interface> Ili9341<I> {
    pub const WIDTH: u16 = 240;
    pub const HEIGHT: u16 = 320;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            mode: LcdMode::Compatible,
            rotation: 0,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            color: 0xFFFF,
            column: 0,
            page: 0,
            block_width: 0,
        }
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_240X320
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Rotates the panel in 90 degree clockwise steps (`0..=3`). Odd
    /// rotations swap the reported width and height.
    pub fn set_rotation(&mut self, rotation: u8) {
        let rotation = rotation & 0x03;
        if (rotation ^ self.rotation) & 0x01 != 0 {
            core::mem::swap(&mut self.width, &mut self.height);
        }
        self.rotation = rotation;
        log::debug!(
            "ili9341: rotation {} ({}x{})",
            rotation,
            self.width,
            self.height
        );
        self.apply_madctl();
    }

    fn madctl(&self) -> u8 {
        let normal = if self.mode == LcdMode::Normal { 4 } else { 0 };
        MADCTL_TABLE[(normal | self.rotation) as usize] | MADCTL_BGR
    }

    fn apply_madctl(&mut self) {
        let madctl = self.madctl();
        self.intf.start();
        self.intf.command_mode();
        self.intf.send(DISPLAY_OFF);
        command_args(&mut self.intf, MADCTL, &[madctl]);
        self.intf.command_mode();
        self.intf.send(DISPLAY_ON);
        self.intf.stop();
    }

    fn address(&mut self, command: u8, from: u16, to: u16) {
        let [f_hi, f_lo] = from.to_be_bytes();
        let [t_hi, t_lo] = to.to_be_bytes();
        command_args(&mut self.intf, command, &[f_hi, f_lo, t_hi, t_lo]);
    }
}

impl<I: Interface> DeviceAdapter for Ili9341<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Ili9341,
            width: self.width,
            height: self.height,
            depth: ColorDepth::Rgb565,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("ili9341: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_init_sequence(&mut self.intf, INIT_240X320);
        self.mode = LcdMode::Compatible;
        self.rotation = 0;
        self.width = Self::WIDTH;
        self.height = Self::HEIGHT;
    }

    fn open_block(&mut self, x: u16, y: u16, w: u16) {
        let rx = if w == 0 { self.width - 1 } else { x + w - 1 };
        let rx = rx.min(self.width - 1);
        self.intf.start();
        match self.mode {
            LcdMode::Compatible => {
                self.column = x;
                self.page = y;
                self.block_width = w;
                let top = y << 3;
                let bottom = (top + 7).min(self.height - 1);
                self.address(PAGE_ADDR, x, rx);
                self.address(COLUMN_ADDR, top, bottom);
            }
            LcdMode::Normal => {
                self.address(COLUMN_ADDR, x, rx);
                self.address(PAGE_ADDR, y, self.height - 1);
            }
        }
        command_args(&mut self.intf, MEMORY_WRITE, &[]);
    }

    fn next_page(&mut self) {
        if self.mode == LcdMode::Compatible {
            self.intf.stop();
            self.open_block(self.column, self.page + 1, self.block_width);
        }
    }

    fn send_pixels1(&mut self, bits: u8) {
        expand_bits16(&mut self.intf, bits, self.color);
    }

    fn send_pixels8(&mut self, pixel: u8) {
        self.send_pixels16(rgb332_to_rgb565(pixel));
    }

    fn mode(&self) -> LcdMode {
        self.mode
    }

    fn set_mode(&mut self, mode: LcdMode) {
        log::debug!("ili9341: {} mode", mode);
        self.mode = mode;
        self.apply_madctl();
    }

    fn set_color(&mut self, color: u16) {
        self.color = color;
    }
}
