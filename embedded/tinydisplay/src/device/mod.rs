//! # Display Controllers
//!
//! One [`DeviceAdapter`] per controller family. An adapter owns the wire
//! [`Interface`] and knows how to open a GDRAM window, advance it, and encode
//! pixels for its controller.
//!
//! ## Addressing modes
//!
//! | Mode | Window | Pixel unit |
//! |------|--------|------------|
//! | [`LcdMode::Compatible`] | `w` columns of one 8-row page, vertical auto-increment | 1 byte = 8 vertical pixels |
//! | [`LcdMode::Normal`] | `w` columns from pixel row `y` to the bottom, horizontal auto-increment | native pixel |
//!
//! ## Sessions
//!
//! GDRAM writes happen inside a [`Block`] returned by
//! [`DeviceAdapter::set_block`]. The block mutably borrows the adapter and
//! closes the wire session when dropped, so windows cannot overlap and mode
//! changes cannot interleave with pixel data.

pub mod ili9341;
pub mod pcd8544;
pub mod sh1106;
pub mod ssd1306;
pub mod ssd1325;
pub mod ssd1331;
pub mod ssd1351;

mod direct;

pub use direct::DirectDisplay;
pub use ili9341::Ili9341;
pub use pcd8544::Pcd8544;
pub use sh1106::Sh1106;
pub use ssd1306::{Ssd1306, Ssd1306Variant};
pub use ssd1325::Ssd1325;
pub use ssd1331::Ssd1331;
pub use ssd1351::Ssd1351;

use core::fmt;

use crate::hal::Interface;

/// Marker in init tables: the next byte is a command argument sent in data mode
pub const CMD_ARG: u8 = 0xFF;

/// GDRAM addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcdMode {
    /// Page-oriented, 1bpp bytes expanded by the controller driver
    #[default]
    Compatible,
    /// Row-oriented, native pixel format
    Normal,
}

impl fmt::Display for LcdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcdMode::Compatible => write!(f, "compatible"),
            LcdMode::Normal => write!(f, "normal"),
        }
    }
}

/// Native pixel depth of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Mono1,
    Gray4,
    Rgb332,
    Rgb565,
}

impl ColorDepth {
    pub const fn bits(&self) -> u8 {
        match self {
            ColorDepth::Mono1 => 1,
            ColorDepth::Gray4 => 4,
            ColorDepth::Rgb332 => 8,
            ColorDepth::Rgb565 => 16,
        }
    }
}

/// Supported controller families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    Ssd1306,
    Sh1106,
    Pcd8544,
    Ssd1325,
    Ssd1331,
    Ssd1351,
    Ili9341,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 7] = [
        ControllerKind::Ssd1306,
        ControllerKind::Sh1106,
        ControllerKind::Pcd8544,
        ControllerKind::Ssd1325,
        ControllerKind::Ssd1331,
        ControllerKind::Ssd1351,
        ControllerKind::Ili9341,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            ControllerKind::Ssd1306 => "ssd1306",
            ControllerKind::Sh1106 => "sh1106",
            ControllerKind::Pcd8544 => "pcd8544",
            ControllerKind::Ssd1325 => "ssd1325",
            ControllerKind::Ssd1331 => "ssd1331",
            ControllerKind::Ssd1351 => "ssd1351",
            ControllerKind::Ili9341 => "ili9341",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of an adapter in its current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterInfo {
    pub kind: ControllerKind,
    pub width: u16,
    pub height: u16,
    pub depth: ColorDepth,
}

/// Controller driver.
///
/// `open_block` and `next_page` are the raw halves of a session; use
/// [`set_block`](Self::set_block) and the returned [`Block`] instead of
/// calling them directly.
pub trait DeviceAdapter {
    type Interface: Interface;

    fn info(&self) -> AdapterInfo;

    /// Wire interface owned by the adapter
    fn interface(&mut self) -> &mut Self::Interface;

    /// Pushes the controller's power-up command sequence
    fn init(&mut self);

    /// Starts a session and opens a GDRAM window at column `x`. `y` is a page
    /// in compatible mode and a pixel row in normal mode. `w == 0` extends
    /// the window to the right edge. Leaves the interface in data mode.
    fn open_block(&mut self, x: u16, y: u16, w: u16);

    /// Moves the window one page down (no-op where GDRAM auto-advances)
    fn next_page(&mut self);

    /// Eight vertical pixels, LSB on top
    fn send_pixels1(&mut self, bits: u8);

    fn send_pixels_buffer1(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.send_pixels1(b);
        }
    }

    /// One 8-bit pixel (RGB332 or gray level)
    fn send_pixels8(&mut self, pixel: u8) {
        self.interface().send(pixel);
    }

    /// One RGB565 pixel
    fn send_pixels16(&mut self, pixel: u16) {
        let [hi, lo] = pixel.to_be_bytes();
        let intf = self.interface();
        intf.send(hi);
        intf.send(lo);
    }

    fn mode(&self) -> LcdMode {
        LcdMode::Compatible
    }

    /// Reprograms the memory access mode. Monochrome controllers only have
    /// the compatible mode and ignore this.
    fn set_mode(&mut self, mode: LcdMode) {
        let _ = mode;
    }

    /// Color used for set bits of `send_pixels1`
    fn set_color(&mut self, color: u16) {
        let _ = color;
    }

    /// Opens a GDRAM window. The session ends when the guard drops.
    fn set_block(&mut self, x: u16, y: u16, w: u16) -> Block<'_, Self>
    where
        Self: Sized,
    {
        self.open_block(x, y, w);
        Block { adapter: self }
    }
}

/// Open GDRAM window; closes the wire session on drop
pub struct Block<'a, A: DeviceAdapter> {
    adapter: &'a mut A,
}

impl<'a, A: DeviceAdapter> Block<'a, A> {
    pub fn info(&self) -> AdapterInfo {
        self.adapter.info()
    }

    pub fn next_page(&mut self) {
        self.adapter.next_page();
    }

    pub fn send_pixels1(&mut self, bits: u8) {
        self.adapter.send_pixels1(bits);
    }

    pub fn send_pixels_buffer1(&mut self, bytes: &[u8]) {
        self.adapter.send_pixels_buffer1(bytes);
    }

    pub fn send_pixels8(&mut self, pixel: u8) {
        self.adapter.send_pixels8(pixel);
    }

    pub fn send_pixels16(&mut self, pixel: u16) {
        self.adapter.send_pixels16(pixel);
    }
}

impl<'a, A: DeviceAdapter> Drop for Block<'a, A> {
    fn drop(&mut self) {
        self.adapter.interface().stop();
    }
}

/// Sends a table of plain commands in one session
pub fn send_commands<I: Interface>(intf: &mut I, commands: &[u8]) {
    intf.start();
    intf.command_mode();
    intf.send_buffer(commands);
    intf.stop();
}

/// Sends an init table in which [`CMD_ARG`] marks the following byte as a
/// data-mode argument
pub fn send_init_sequence<I: Interface>(intf: &mut I, table: &[u8]) {
    intf.start();
    intf.command_mode();
    let mut bytes = table.iter();
    while let Some(&b) = bytes.next() {
        if b == CMD_ARG {
            if let Some(&arg) = bytes.next() {
                intf.data_mode();
                intf.send(arg);
                intf.command_mode();
            }
        } else {
            intf.send(b);
        }
    }
    intf.stop();
}

/// Command followed by its arguments in data mode; used inside open sessions
pub(crate) fn command_args<I: Interface>(intf: &mut I, command: u8, args: &[u8]) {
    intf.command_mode();
    intf.send(command);
    intf.data_mode();
    intf.send_buffer(args);
}

/// Expands 8 vertical pixels into 8 one-byte pixels
pub(crate) fn expand_bits8<I: Interface>(intf: &mut I, bits: u8, color: u8) {
    for i in 0..8 {
        intf.send(if bits & (1 << i) != 0 { color } else { 0 });
    }
}

/// Expands 8 vertical pixels into 8 big-endian RGB565 pixels
pub(crate) fn expand_bits16<I: Interface>(intf: &mut I, bits: u8, color: u16) {
    let [hi, lo] = color.to_be_bytes();
    for i in 0..8 {
        if bits & (1 << i) != 0 {
            intf.send(hi);
            intf.send(lo);
        } else {
            intf.send(0);
            intf.send(0);
        }
    }
}

/// Right edge of a window: `w == 0` means the last column
#[inline]
pub(crate) fn window_end(x: u16, w: u16, limit: u16) -> u16 {
    let rx = if w == 0 { limit - 1 } else { x + w - 1 };
    rx.min(limit - 1)
}

/// Last row of page `page`, clamped to the display
#[inline]
pub(crate) fn page_end(page: u16, height: u16) -> u16 {
    ((page << 3) + 7).min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{RecordingInterface, WireEvent};

    #[test]
    fn test_init_sequence_cmd_arg() {
        let mut intf = RecordingInterface::new();
        send_init_sequence(&mut intf, &[0x11, 0x3A, CMD_ARG, 0x05, 0x29]);
        assert_eq!(
            intf.events(),
            &[
                WireEvent::Start,
                WireEvent::Command(0x11),
                WireEvent::Command(0x3A),
                WireEvent::Data(0x05),
                WireEvent::Command(0x29),
                WireEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_expand_bits() {
        let mut intf = RecordingInterface::new();
        intf.start();
        expand_bits8(&mut intf, 0b1000_0001, 0xE0);
        assert_eq!(intf.commands(), vec![0xE0, 0, 0, 0, 0, 0, 0, 0xE0]);
        intf.clear();
        expand_bits16(&mut intf, 0b0000_0010, 0xF81F);
        assert_eq!(&intf.commands()[..4], &[0, 0, 0xF8, 0x1F]);
    }

    #[test]
    fn test_window_helpers() {
        assert_eq!(window_end(10, 5, 128), 14);
        assert_eq!(window_end(10, 0, 128), 127);
        assert_eq!(window_end(120, 20, 128), 127);
        assert_eq!(page_end(7, 64), 63);
        assert_eq!(page_end(7, 60), 59);
    }
}
