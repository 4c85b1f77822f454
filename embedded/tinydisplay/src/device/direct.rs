//! Direct-to-GDRAM drawing
//!
//! [`DirectDisplay`] runs the draw engine straight against a controller with
//! no framebuffer in between. GDRAM cannot be read back over the wire, so in
//! compatible mode every write replaces whole page bytes; pixels sharing a
//! byte with a new write are cleared.

use super::{Block, ColorDepth, DeviceAdapter, LcdMode};
use crate::engine::{self, FontStyle, PageBits, PageBlit, PixelSink, TextMode, TextState};
use crate::font::{FontTable, MonoBitmap};
use crate::geometry::Point;

/// Unbuffered drawing sink over a [`DeviceAdapter`]
pub struct DirectDisplay<'f, A: DeviceAdapter> {
    adapter: A,
    color: u16,
    inverted: bool,
    text: TextState,
    font: Option<FontTable<'f>>,
}

/// One native pixel for a normal-mode stream
fn send_native<A: DeviceAdapter>(block: &mut Block<'_, A>, depth: ColorDepth, value: u16) {
    match depth {
        ColorDepth::Rgb565 => block.send_pixels16(value),
        _ => block.send_pixels8(value as u8),
    }
}

impl<'f, A: DeviceAdapter> DirectDisplay<'f, A> {
    pub fn new(adapter: A) -> Self {
        let mut display = Self {
            adapter,
            color: 0xFFFF,
            inverted: false,
            text: TextState::default(),
            font: None,
        };
        display.adapter.set_color(display.color);
        display
    }

    /// Pushes the controller init sequence
    pub fn init(&mut self) {
        self.adapter.init();
        self.adapter.set_color(self.color);
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn release(self) -> A {
        self.adapter
    }

    pub fn width(&self) -> u16 {
        self.adapter.info().width
    }

    pub fn height(&self) -> u16 {
        self.adapter.info().height
    }

    pub fn mode(&self) -> LcdMode {
        self.adapter.mode()
    }

    pub fn set_mode(&mut self, mode: LcdMode) {
        if self.adapter.mode() != mode {
            self.adapter.set_mode(mode);
        }
    }

    pub fn color(&self) -> u16 {
        self.color
    }

    /// Sets the drawing color; compatible-mode color controllers paint set
    /// bits with it
    pub fn set_color(&mut self, color: u16) {
        self.color = color;
        self.adapter.set_color(color);
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Negative mode: lit and dark swap for everything drawn afterwards
    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn font(&self) -> Option<FontTable<'f>> {
        self.font
    }

    pub fn set_font(&mut self, font: FontTable<'f>) {
        self.font = Some(font);
    }

    pub fn text_mode(&self) -> TextMode {
        self.text.mode
    }

    pub fn set_text_mode(&mut self, mode: TextMode) {
        self.text.mode = mode;
    }

    pub fn cursor(&self) -> Point {
        self.text.cursor
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.text.cursor = Point::new(x, y);
    }

    fn invert_mask(&self) -> u8 {
        if self.inverted {
            0xFF
        } else {
            0x00
        }
    }

    /// Native value for a normal-mode pixel drawn in `color`
    fn native(&self, color: u16) -> u16 {
        match (self.inverted, color) {
            (false, c) => c,
            (true, 0) => self.color,
            (true, _) => 0,
        }
    }

    /// Fills the whole display with `byte`: a page byte in compatible mode,
    /// a native pixel value (replicated to 16 bits) in normal mode
    pub fn fill_screen(&mut self, byte: u8) {
        let info = self.adapter.info();
        let pages = (info.height + 7) >> 3;
        match self.adapter.mode() {
            LcdMode::Compatible => {
                let byte = byte ^ self.invert_mask();
                let mut block = self.adapter.set_block(0, 0, 0);
                for page in 0..pages {
                    if page > 0 {
                        block.next_page();
                    }
                    for _ in 0..info.width {
                        block.send_pixels1(byte);
                    }
                }
            }
            LcdMode::Normal => {
                let value = u16::from_be_bytes([byte, byte]);
                let mut block = self.adapter.set_block(0, 0, 0);
                for _ in 0..info.width as u32 * info.height as u32 {
                    send_native(&mut block, info.depth, value);
                }
            }
        }
    }

    pub fn clear_screen(&mut self) {
        self.fill_screen(0x00);
    }

    /// Clears a `w` x `h` area at `(x, y)`
    pub fn clear_block(&mut self, x: i32, y: i32, w: u16, h: u16) {
        if w == 0 || h == 0 {
            return;
        }
        engine::clear_rect(self, x, y, x + w as i32 - 1, y + h as i32 - 1);
    }

    /// Sends page-ordered 1bpp data (`w` bytes per page) at column `x`,
    /// page `page`. Switches the adapter to compatible mode.
    pub fn draw_buffer1(&mut self, x: u16, page: u16, w: u16, pages: u16, bytes: &[u8]) {
        self.set_mode(LcdMode::Compatible);
        let info = self.adapter.info();
        let max_pages = (info.height + 7) >> 3;
        if w == 0 || x >= info.width || page >= max_pages {
            return;
        }
        let cols = w.min(info.width - x);
        let pages = pages.min(max_pages - page);
        let invert = self.invert_mask();
        let mut block = self.adapter.set_block(x, page, cols);
        for p in 0..pages {
            if p > 0 {
                block.next_page();
            }
            let row = p as usize * w as usize;
            for col in 0..cols as usize {
                let byte = bytes.get(row + col).copied().unwrap_or(0);
                block.send_pixels1(byte ^ invert);
            }
        }
    }

    /// Sends row-major 8-bit pixels. Switches the adapter to normal mode.
    pub fn draw_buffer8(&mut self, x: u16, y: u16, w: u16, h: u16, bytes: &[u8]) {
        self.draw_native(x, y, w, h, 1, |block, i| {
            block.send_pixels8(bytes.get(i).copied().unwrap_or(0));
        });
    }

    /// Sends row-major big-endian RGB565 pixels. Switches the adapter to
    /// normal mode.
    pub fn draw_buffer16(&mut self, x: u16, y: u16, w: u16, h: u16, bytes: &[u8]) {
        self.draw_native(x, y, w, h, 2, |block, i| {
            let hi = bytes.get(2 * i).copied().unwrap_or(0);
            let lo = bytes.get(2 * i + 1).copied().unwrap_or(0);
            block.send_pixels16(u16::from_be_bytes([hi, lo]));
        });
    }

    fn draw_native<F>(&mut self, x: u16, y: u16, w: u16, h: u16, bpp: u8, mut send: F)
    where
        F: FnMut(&mut Block<'_, A>, usize),
    {
        let info = self.adapter.info();
        if info.depth == ColorDepth::Mono1 {
            log::debug!("{}: no native color mode, {}-byte buffer dropped", info.kind, bpp);
            return;
        }
        self.set_mode(LcdMode::Normal);
        if w == 0 || h == 0 || x >= info.width || y >= info.height {
            return;
        }
        let cols = w.min(info.width - x);
        let rows = h.min(info.height - y);
        let mut block = self.adapter.set_block(x, y, cols);
        for row in 0..rows as usize {
            for col in 0..cols as usize {
                send(&mut block, row * w as usize + col);
            }
        }
    }

    pub fn put_pixel(&mut self, x: i32, y: i32) {
        engine::put_pixel(self, x, y);
    }

    pub fn draw_hline(&mut self, x1: i32, y: i32, x2: i32) {
        engine::draw_hline(self, x1, y, x2);
    }

    pub fn draw_vline(&mut self, x: i32, y1: i32, y2: i32) {
        engine::draw_vline(self, x, y1, y2);
    }

    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        engine::draw_line(self, x1, y1, x2, y2);
    }

    pub fn draw_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        engine::draw_rect(self, x1, y1, x2, y2);
    }

    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        engine::fill_rect(self, x1, y1, x2, y2);
    }

    pub fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        engine::clear_rect(self, x1, y1, x2, y2);
    }

    pub fn draw_bitmap1(&mut self, x: i32, y: i32, bitmap: &MonoBitmap) {
        engine::draw_bitmap1(self, x, y, bitmap);
    }

    pub fn draw_xbitmap1(&mut self, x: i32, y: i32, w: u16, h: u16, bits: &[u8]) {
        engine::draw_xbitmap1(self, x, y, w, h, bits);
    }

    pub fn print_fixed(&mut self, x: i32, y: i32, text: &str, style: FontStyle) -> usize {
        match self.font {
            Some(font) => engine::print_fixed(self, &font, x, y, text, style),
            None => 0,
        }
    }

    /// Text with every glyph pixel enlarged to a `2^factor` square
    pub fn print_fixed_n(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        style: FontStyle,
        factor: u8,
    ) -> usize {
        match self.font {
            Some(font) => engine::print_fixed_n(self, &font, x, y, text, style, factor),
            None => 0,
        }
    }

    pub fn print(&mut self, text: &str) -> usize {
        match self.font {
            Some(font) => engine::print(self, &font, text),
            None => 0,
        }
    }

    pub fn write(&mut self, byte: u8) -> usize {
        match self.font {
            Some(font) => engine::write(self, &font, byte),
            None => 0,
        }
    }

    /// Band-masked page bytes for rows `y1..=y2` of `page`
    fn page_mask(page: u16, y1: u16, y2: u16) -> u8 {
        let top = (page << 3).max(y1) - (page << 3);
        let bottom = ((page << 3) + 7).min(y2) - (page << 3);
        (((1u16 << (bottom + 1)) - 1) as u8) & !(((1u16 << top) - 1) as u8)
    }

    /// Writes rows `y1..=y2` of columns `x1..=x2` in compatible mode
    fn compat_fill(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        let invert = self.invert_mask();
        let (first, last) = (y1 >> 3, y2 >> 3);
        let mut block = self.adapter.set_block(x1, first, x2 - x1 + 1);
        for page in first..=last {
            if page > first {
                block.next_page();
            }
            let byte = if color != 0 {
                Self::page_mask(page, y1, y2)
            } else {
                0
            };
            for _ in x1..=x2 {
                block.send_pixels1(byte ^ invert);
            }
        }
    }

    /// Streams a `w`-wide window of `rows` native pixels in normal mode
    fn normal_fill(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        let depth = self.adapter.info().depth;
        let value = self.native(color);
        let count = (x2 - x1 + 1) as u32 * (y2 - y1 + 1) as u32;
        let mut block = self.adapter.set_block(x1, y1, x2 - x1 + 1);
        for _ in 0..count {
            send_native(&mut block, depth, value);
        }
    }

    fn fill_area(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        match self.adapter.mode() {
            LcdMode::Compatible => self.compat_fill(x1, y1, x2, y2, color),
            LcdMode::Normal => self.normal_fill(x1, y1, x2, y2, color),
        }
    }
}

impl<'f, A: DeviceAdapter> PixelSink for DirectDisplay<'f, A> {
    fn width(&self) -> u16 {
        self.adapter.info().width
    }

    fn height(&self) -> u16 {
        self.adapter.info().height
    }

    fn color(&self) -> u16 {
        self.color
    }

    fn set_color(&mut self, color: u16) {
        DirectDisplay::set_color(self, color);
    }

    fn text_state(&self) -> &TextState {
        &self.text
    }

    fn text_state_mut(&mut self) -> &mut TextState {
        &mut self.text
    }

    fn raw_pixel(&mut self, x: u16, y: u16, color: u16) {
        self.fill_area(x, y, x, y, color);
    }

    fn raw_hline(&mut self, x1: u16, x2: u16, y: u16, color: u16) {
        self.fill_area(x1, y, x2, y, color);
    }

    fn raw_vline(&mut self, x: u16, y1: u16, y2: u16, color: u16) {
        self.fill_area(x, y1, x, y2, color);
    }

    fn raw_fill(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        self.fill_area(x1, y1, x2, y2, color);
    }

    fn raw_pages<G>(&mut self, blit: PageBlit, mut bits: G)
    where
        G: FnMut(u16, u16) -> PageBits,
    {
        if blit.width == 0 || blit.pages == 0 {
            return;
        }
        match self.adapter.mode() {
            LcdMode::Compatible => {
                let invert = self.invert_mask();
                let mut block = self.adapter.set_block(blit.x, blit.page, blit.width);
                for band in 0..blit.pages {
                    if band > 0 {
                        block.next_page();
                    }
                    for col in 0..blit.width {
                        let PageBits { data, mask } = bits(col, band);
                        let byte = if blit.color != 0 { data & mask } else { 0 };
                        block.send_pixels1(byte ^ invert);
                    }
                }
            }
            LcdMode::Normal => {
                // Rows covered by the source; a stream cannot skip pixels,
                // so clear bits are always written.
                let first = bits(0, 0).mask;
                let last = bits(0, blit.pages - 1).mask;
                if first == 0 || last == 0 {
                    return;
                }
                let top = (blit.page << 3) + first.trailing_zeros() as u16;
                let bottom = ((blit.page + blit.pages - 1) << 3) + 7 - last.leading_zeros() as u16;
                let depth = self.adapter.info().depth;
                let lit = self.native(blit.color);
                let dark = self.native(0);
                let mut block = self.adapter.set_block(blit.x, top, blit.width);
                for row in top..=bottom {
                    let band = (row >> 3) - blit.page;
                    let bit = 1u8 << (row & 7);
                    for col in 0..blit.width {
                        let value = if bits(col, band).data & bit != 0 { lit } else { dark };
                        send_native(&mut block, depth, value);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ssd1306::replay_gdram;
    use crate::device::{Pcd8544, Sh1106, Ssd1306, Ssd1306Variant, Ssd1331};
    use crate::font::{FontTable, FONT_6X8};
    use crate::hal::mock::RecordingInterface;
    use crate::surface::{Mono1, PixelSurface};
    use hex_literal::hex;

    fn ssd1306() -> DirectDisplay<'static, Ssd1306<RecordingInterface>> {
        DirectDisplay::new(Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64))
    }

    #[test]
    fn test_clipped_draws_stay_balanced() {
        let mut display = ssd1306();
        display.set_font(FontTable::fixed(&FONT_6X8).unwrap());
        display.draw_line(-10, -10, 200, 100);
        display.fill_rect(120, 60, 300, 300);
        display.put_pixel(-1, 5);
        display.draw_rect(-5, -5, 500, 500);
        display.print_fixed(120, 60, "clip", FontStyle::Bold);
        display.clear_block(-20, -20, 10, 10);
        let intf = display.release().release();
        assert!(intf.is_balanced());
        assert!(intf.starts() > 0);
    }

    #[test]
    fn test_hline_is_one_session() {
        let mut display = ssd1306();
        display.draw_hline(10, 3, 14);
        let intf = display.release().release();
        assert_eq!(intf.starts(), 1);
        assert_eq!(intf.stops(), 1);
        assert_eq!(intf.commands(), hex!("21 0a 0e 22 00 07").to_vec());
        assert_eq!(intf.data(), vec![0x08; 5]);
    }

    #[test]
    fn test_set_block_closed_before_next() {
        let mut display = ssd1306();
        {
            let _block = display.adapter_mut().set_block(10, 0, 5);
        }
        assert!(!display.adapter_mut().interface().is_open());
        display.put_pixel(0, 0);
        let intf = display.release().release();
        assert_eq!(intf.starts(), 2);
        assert!(intf.is_balanced());
    }

    #[test]
    fn test_vline_crosses_pages() {
        let mut display = DirectDisplay::new(Sh1106::new(RecordingInterface::new()));
        display.draw_vline(5, 4, 12);
        let intf = display.release().release();
        assert_eq!(intf.commands(), hex!("b0 10 07 b1 10 07").to_vec());
        assert_eq!(intf.data(), vec![0xF0, 0x1F]);
        assert!(intf.is_balanced());
    }

    #[test]
    fn test_inverted_clear_screen() {
        let mut display = DirectDisplay::new(Pcd8544::new(RecordingInterface::new()));
        display.set_inverted(true);
        display.clear_screen();
        let intf = display.release().release();
        assert_eq!(intf.data().len(), 84 * 6);
        assert!(intf.data().iter().all(|&b| b == 0xFF));
        assert!(intf.is_balanced());
    }

    #[test]
    fn test_normal_mode_native_pixel() {
        let mut display = DirectDisplay::new(Ssd1331::new(RecordingInterface::new()));
        display.set_mode(LcdMode::Normal);
        display.set_color(0xE0);
        display.put_pixel(3, 4);
        let intf = display.release().release();
        assert_eq!(intf.commands(), hex!("a0 32 15 03 03 75 04 3f").to_vec());
        assert_eq!(intf.data(), vec![0xE0]);
    }

    #[test]
    fn test_normal_mode_blit_is_opaque() {
        let mut display = DirectDisplay::new(Ssd1331::new(RecordingInterface::new()));
        display.set_mode(LcdMode::Normal);
        display.set_color(0x1C);
        display.set_text_mode(TextMode::TRANSPARENT);
        let data = [0b01u8, 0b10];
        display.draw_bitmap1(0, 0, &MonoBitmap::new(2, 2, &data));
        let intf = display.release().release();
        assert_eq!(intf.commands(), hex!("a0 32 15 00 01 75 00 3f").to_vec());
        assert_eq!(intf.data(), vec![0x1C, 0x00, 0x00, 0x1C]);
    }

    #[test]
    fn test_compat_color_expands_bits() {
        let mut display = DirectDisplay::new(Ssd1331::new(RecordingInterface::new()));
        display.set_color(0x03);
        display.put_pixel(0, 1);
        let intf = display.release().release();
        assert_eq!(intf.data(), hex!("00 03 00 00 00 00 00 00").to_vec());
    }

    #[test]
    fn test_draw_buffer8_switches_mode() {
        let mut display = DirectDisplay::new(Ssd1331::new(RecordingInterface::new()));
        display.draw_buffer8(94, 62, 4, 4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(display.mode(), LcdMode::Normal);
        let intf = display.release().release();
        assert_eq!(intf.data(), vec![1, 2, 5, 6]);
        assert!(intf.is_balanced());
    }

    #[test]
    fn test_draw_buffer1_pages() {
        let mut display = DirectDisplay::new(Sh1106::new(RecordingInterface::new()));
        display.draw_buffer1(0, 6, 2, 4, &hex!("01 02 03 04 05 06"));
        let intf = display.release().release();
        assert_eq!(intf.sessions().len(), 2);
        assert_eq!(intf.data(), hex!("01 02 03 04").to_vec());
    }

    #[test]
    fn test_bold_text_matches_surface() {
        let font = FontTable::fixed(&FONT_6X8).unwrap();
        let mut buf = [0u8; 1024];
        let mut surface = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        surface.set_font(font);
        surface.print_fixed(0, 0, "||", FontStyle::Bold);
        surface.print_fixed(0, 20, "|", FontStyle::Bold);

        let mut display = ssd1306();
        display.set_font(font);
        display.print_fixed(0, 0, "||", FontStyle::Bold);
        display.print_fixed(0, 20, "|", FontStyle::Bold);
        let intf = display.release().release();
        assert!(intf.is_balanced());

        let gdram = replay_gdram(&intf, 64);
        assert_eq!(&gdram[..12], &hex!("00 00 00 7f 7f 00 00 00 00 7f 7f 00"));
        assert_eq!(surface.buffer(), &gdram[..]);
    }

    #[test]
    fn test_scaled_text_matches_surface() {
        let font = FontTable::fixed(&FONT_6X8).unwrap();
        let mut buf = [0u8; 1024];
        let mut surface = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        surface.set_font(font);
        surface.print_fixed_n(8, 16, "Hi!", FontStyle::Normal, 1);
        surface.print_fixed_n(0, 32, "|", FontStyle::Bold, 2);

        let mut display = ssd1306();
        display.set_font(font);
        assert_eq!(display.print_fixed_n(8, 16, "Hi!", FontStyle::Normal, 1), 3);
        display.print_fixed_n(0, 32, "|", FontStyle::Bold, 2);
        let intf = display.release().release();
        assert!(intf.is_balanced());

        let gdram = replay_gdram(&intf, 64);
        // '|' bold at 4x: glyph columns 3..=4 become columns 12..=19
        assert_eq!(gdram[4 * 128 + 12], 0xFF);
        assert_eq!(gdram[4 * 128 + 20], 0x00);
        assert_eq!(surface.buffer(), &gdram[..]);
    }
}
