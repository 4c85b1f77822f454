//! SSD1351 RGB OLED (128x128, 16-bit RGB565)
//!
//! Command arguments travel in data mode, so addressing and init both rely
//! on D/C switching within a session.

use super::{
    command_args, expand_bits16, page_end, send_init_sequence, window_end, AdapterInfo, ColorDepth,
    ControllerKind, DeviceAdapter, LcdMode, CMD_ARG,
};
use crate::color::rgb332_to_rgb565;
use crate::hal::Interface;

/// SSD1351 command set
#[allow(dead_code)]
pub mod cmd {
    pub const COLUMN_ADDR: u8 = 0x15;
    pub const WRITE_RAM: u8 = 0x5C;
    pub const ROW_ADDR: u8 = 0x75;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const SET_START_LINE: u8 = 0xA1;
    pub const SET_DISPLAY_OFFSET: u8 = 0xA2;
    pub const SET_FUNCTION: u8 = 0xAB;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERSE_DISPLAY: u8 = 0xA7;
    pub const SLEEP_ON: u8 = 0xAE;
    pub const SLEEP_OFF: u8 = 0xAF;
    pub const SET_PRECHARGE: u8 = 0xB1;
    pub const CLOCK_DIV: u8 = 0xB3;
    pub const EXT_VSL: u8 = 0xB4;
    pub const SET_GPIO: u8 = 0xB5;
    pub const PRECHARGE_SECOND: u8 = 0xB6;
    pub const PRECHARGE_LEVEL: u8 = 0xBB;
    pub const VCOMH: u8 = 0xBE;
    pub const CONTRAST: u8 = 0xC1;
    pub const MASTER_CURRENT: u8 = 0xC7;
    pub const SET_MULTIPLEX: u8 = 0xCA;
    pub const UNLOCK: u8 = 0xFD;

    /// Remap for 65k color with vertical increment
    pub const REMAP_COMPATIBLE: u8 = 0b0011_0101;
    pub const REMAP_NORMAL: u8 = 0b0011_0100;
}

use cmd::*;

#[rustfmt::skip]
static INIT_128X128: &[u8] = &[
    UNLOCK, CMD_ARG, 0x12,
    UNLOCK, CMD_ARG, 0xB1,
    SLEEP_ON,
    CLOCK_DIV, CMD_ARG, 0xF1,
    SET_MULTIPLEX, CMD_ARG, 127,
    SEG_REMAP, CMD_ARG, REMAP_COMPATIBLE,
    SET_START_LINE, CMD_ARG, 0x00,
    SET_DISPLAY_OFFSET, CMD_ARG, 0x00,
    SET_GPIO, CMD_ARG, 0x00,
    SET_FUNCTION, CMD_ARG, 0x01,
    SET_PRECHARGE, CMD_ARG, 0x32,
    VCOMH, CMD_ARG, 0x05,
    PRECHARGE_LEVEL, CMD_ARG, 0x17,
    NORMAL_DISPLAY,
    CONTRAST, CMD_ARG, 0xC8, CMD_ARG, 0x80, CMD_ARG, 0xC8,
    MASTER_CURRENT, CMD_ARG, 0x0F,
    EXT_VSL, CMD_ARG, 0xA0, CMD_ARG, 0xB5, CMD_ARG, 0x55,
    PRECHARGE_SECOND, CMD_ARG, 0x01,
    SLEEP_OFF,
    NORMAL_DISPLAY,
];

pub struct Ssd1351<I: Interface> {
    intf: I,
    mode: LcdMode,
    color: u16,
    column: u16,
    page: u16,
    width: u16,
}

impl<I: Interface> Ssd1351<I> {
    pub const WIDTH: u16 = 128;
    pub const HEIGHT: u16 = 128;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            mode: LcdMode::Compatible,
            color: 0xFFFF,
            column: 0,
            page: 0,
            width: 0,
        }
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_128X128
    }

    fn open_window(&mut self, x: u16, rx: u16, y1: u16, y2: u16) {
        self.intf.start();
        command_args(&mut self.intf, COLUMN_ADDR, &[x as u8, rx as u8]);
        command_args(&mut self.intf, ROW_ADDR, &[y1 as u8, y2 as u8]);
        command_args(&mut self.intf, WRITE_RAM, &[]);
    }
}

impl<I: Interface> DeviceAdapter for Ssd1351<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Ssd1351,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            depth: ColorDepth::Rgb565,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("ssd1351: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_init_sequence(&mut self.intf, INIT_128X128);
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
        log::debug!("ssd1351: {} mode", mode);
        self.mode = mode;
        let remap = if mode == LcdMode::Compatible {
            REMAP_COMPATIBLE
        } else {
            REMAP_NORMAL
        };
        self.intf.start();
        command_args(&mut self.intf, SEG_REMAP, &[remap]);
        self.intf.stop();
    }

    fn set_color(&mut self, color: u16) {
        self.color = color;
    }
}
