//! SSD1331 RGB OLED (96x64, 8-bit RGB332)

use super::{
    expand_bits8, page_end, send_commands, window_end, AdapterInfo, ColorDepth, ControllerKind,
    DeviceAdapter, LcdMode,
};
use crate::color::Color;
use crate::hal::Interface;

/// SSD1331 command set
#[allow(dead_code)]
pub mod cmd {
    pub const COLUMN_ADDR: u8 = 0x15;
    pub const DRAW_LINE: u8 = 0x21;
    pub const ROW_ADDR: u8 = 0x75;
    pub const CONTRAST_A: u8 = 0x81;
    pub const CONTRAST_B: u8 = 0x82;
    pub const CONTRAST_C: u8 = 0x83;
    pub const MASTER_CURRENT: u8 = 0x87;
    pub const PRECHARGE_A: u8 = 0x8A;
    pub const PRECHARGE_B: u8 = 0x8B;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const SET_START_LINE: u8 = 0xA1;
    pub const SET_DISPLAY_OFFSET: u8 = 0xA2;
    pub const NORMAL_DISPLAY: u8 = 0xA4;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const SET_MASTER: u8 = 0xAD;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const POWER_MODE: u8 = 0xB0;
    pub const SET_PRECHARGE: u8 = 0xB1;
    pub const CLOCK_DIV: u8 = 0xB3;
    pub const PRECHARGE_LEVEL: u8 = 0xBB;
    pub const VCOMH: u8 = 0xBE;

    /// Remap: 8-bit color, COM split, column remap
    pub const REMAP_BASE: u8 = 0x20 | 0x10 | 0x02;
    pub const REMAP_VERTICAL: u8 = 0x01;
}

use cmd::*;

#[rustfmt::skip]
static INIT_96X64: &[u8] = &[
    DISPLAY_OFF,
    SEG_REMAP, REMAP_BASE | REMAP_VERTICAL,
    SET_START_LINE, 0x00,
    SET_DISPLAY_OFFSET, 0x00,
    NORMAL_DISPLAY,
    SET_MULTIPLEX, 63,
    SET_MASTER, 0x8E,
    POWER_MODE, 0x0B,
    SET_PRECHARGE, 0x31,
    CLOCK_DIV, 0xF0,
    PRECHARGE_A, 0x64,
    PRECHARGE_B, 0x78,
    PRECHARGE_LEVEL, 0x3A,
    VCOMH, 0x3E,
    MASTER_CURRENT, 0x09,
    CONTRAST_A, 0x91,
    CONTRAST_B, 0x50,
    CONTRAST_C, 0x7D,
    DISPLAY_ON,
];

pub struct Ssd1331<I: Interface> {
    intf: I,
    mode: LcdMode,
    color: u8,
    column: u16,
    page: u16,
    width: u16,
}

impl<I: Interface> Ssd1331<I> {
    pub const WIDTH: u16 = 96;
    pub const HEIGHT: u16 = 64;

    pub fn new(intf: I) -> Self {
        Self {
            intf,
            mode: LcdMode::Compatible,
            color: 0xFF,
            column: 0,
            page: 0,
            width: 0,
        }
    }

    pub fn release(self) -> I {
        self.intf
    }

    pub fn init_table() -> &'static [u8] {
        INIT_96X64
    }

    fn open_window(&mut self, x: u16, rx: u16, y1: u16, y2: u16) {
        self.intf.start();
        self.intf.command_mode();
        self.intf.send_buffer(&[
            COLUMN_ADDR,
            x as u8,
            rx as u8,
            ROW_ADDR,
            y1 as u8,
            y2 as u8,
        ]);
        self.intf.data_mode();
    }
}

impl<I: Interface> DeviceAdapter for Ssd1331<I> {
    type Interface = I;

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            kind: ControllerKind::Ssd1331,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            depth: ColorDepth::Rgb332,
        }
    }

    fn interface(&mut self) -> &mut I {
        &mut self.intf
    }

    fn init(&mut self) {
        log::debug!("ssd1331: init {}x{}", Self::WIDTH, Self::HEIGHT);
        send_commands(&mut self.intf, INIT_96X64);
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
        expand_bits8(&mut self.intf, bits, self.color);
    }

    fn send_pixels16(&mut self, pixel: u16) {
        self.intf.send(Color::from_rgb565(pixel).to_rgb332());
    }

    fn mode(&self) -> LcdMode {
        self.mode
    }

    fn set_mode(&mut self, mode: LcdMode) {
        log::debug!("ssd1331: {} mode", mode);
        self.mode = mode;
        let vertical = if mode == LcdMode::Compatible { REMAP_VERTICAL } else { 0 };
        send_commands(&mut self.intf, &[SEG_REMAP, REMAP_BASE | vertical]);
    }

    fn set_color(&mut self, color: u16) {
        self.color = color as u8;
    }
}
