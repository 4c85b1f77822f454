//! # Pixel Surfaces
//!
//! In-memory packed framebuffer over a caller-owned byte slice. One generic
//! type covers every bit depth; the [`PixelFormat`] parameter decides how
//! pixels are packed and how the buffer is streamed to a device.
//!
//! ```text
//!  Mono1 (128x64)           Rgb565 (w x h)
//!  ┌───────────────────┐    ┌───────────────────┐
//!  │ page 0: 128 bytes │    │ row 0: 2*w bytes  │
//!  │ page 1: 128 bytes │    │ row 1: 2*w bytes  │
//!  │ ...               │    │ ...               │
//!  └───────────────────┘    └───────────────────┘
//! ```

mod format;

pub use format::{Gray4, Mono1, PixelFormat, Rgb332, Rgb565};

use core::fmt;
use core::marker::PhantomData;

use crate::device::DeviceAdapter;
use crate::engine::{self, FontStyle, PageBits, PageBlit, PixelSink, TextMode, TextState};
use crate::font::{FontTable, MonoBitmap};
use crate::geometry::Point;

/// Surface construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// Buffer shorter than the format needs for the requested size
    BufferTooSmall { needed: usize, actual: usize },
    /// Height the format cannot pack (1bpp needs a multiple of 8)
    UnalignedHeight(u16),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::BufferTooSmall { needed, actual } => {
                write!(f, "surface buffer too small: need {} bytes, got {}", needed, actual)
            }
            SurfaceError::UnalignedHeight(h) => {
                write!(f, "height {} is not a multiple of 8", h)
            }
        }
    }
}

/// Packed framebuffer with drawing state
pub struct PixelSurface<'a, F: PixelFormat> {
    width: u16,
    height: u16,
    buffer: &'a mut [u8],
    color: u16,
    offset: Point,
    text: TextState,
    font: Option<FontTable<'a>>,
    _format: PhantomData<F>,
}

impl<'a, F: PixelFormat> PixelSurface<'a, F> {
    /// Wraps `buffer` as a `width` x `height` surface. The buffer is not
    /// cleared.
    pub fn new(width: u16, height: u16, buffer: &'a mut [u8]) -> Result<Self, SurfaceError> {
        if !F::height_supported(height) {
            return Err(SurfaceError::UnalignedHeight(height));
        }
        let needed = F::buffer_len(width, height);
        if buffer.len() < needed {
            return Err(SurfaceError::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }
        Ok(Self {
            width,
            height,
            buffer,
            color: 0xFFFF,
            offset: Point::ORIGIN,
            text: TextState::default(),
            font: None,
            _format: PhantomData,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The packed pixels, `F::buffer_len` bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..F::buffer_len(self.width, self.height)]
    }

    /// Current drawing color in the format's encoding
    pub fn color(&self) -> u16 {
        self.color
    }

    pub fn set_color(&mut self, color: u16) {
        self.color = color;
    }

    /// Viewport origin: drawing at `offset` touches pixel `(0, 0)`
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset = Point::new(x, y);
    }

    pub fn font(&self) -> Option<FontTable<'a>> {
        self.font
    }

    pub fn set_font(&mut self, font: FontTable<'a>) {
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

    /// Zero-fills the whole buffer
    pub fn clear(&mut self) {
        let len = F::buffer_len(self.width, self.height);
        self.buffer[..len].fill(0);
    }

    pub fn put_pixel(&mut self, x: i32, y: i32) {
        engine::put_pixel(self, x, y);
    }

    /// Stored value at `(x, y)` in caller coordinates
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u16> {
        let (x, y) = (x.saturating_sub(self.offset.x), y.saturating_sub(self.offset.y));
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(F::get(&*self.buffer, self.width, x as u16, y as u16))
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

    /// Prints `text` at `(x, y)` with the active font. Returns the number of
    /// characters consumed; nothing is drawn without a font.
    pub fn print_fixed(&mut self, x: i32, y: i32, text: &str, style: FontStyle) -> usize {
        match self.font {
            Some(font) => engine::print_fixed(self, &font, x, y, text, style),
            None => 0,
        }
    }

    /// Prints `text` enlarged `2^factor` times, wrapping back to `x`
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

    /// Streams one byte of UTF-8 text at the cursor
    pub fn write(&mut self, byte: u8) -> usize {
        match self.font {
            Some(font) => engine::write(self, &font, byte),
            None => 0,
        }
    }

    /// Sends the surface to the adapter at its offset (negative parts clamp
    /// to 0). The adapter is switched to the mode the format streams in.
    pub fn blt<A: DeviceAdapter>(&self, adapter: &mut A) {
        self.blt_at(adapter, self.offset.x.max(0) as u16, self.offset.y.max(0) as u16);
    }

    /// Sends the surface with its top-left corner at display `(x, y)`.
    ///
    /// [`Mono1`] surfaces are sent as whole 8-row pages, so their `y` is
    /// rounded down to a multiple of 8: `y = 11` lands on rows 8..16.
    pub fn blt_at<A: DeviceAdapter>(&self, adapter: &mut A, x: u16, y: u16) {
        if adapter.mode() != F::MODE {
            adapter.set_mode(F::MODE);
        }
        F::flush(&*self.buffer, self.width, self.height, x, y, adapter);
    }
}

impl<'a, F: PixelFormat> PixelSink for PixelSurface<'a, F> {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn offset(&self) -> Point {
        self.offset
    }

    fn color(&self) -> u16 {
        self.color
    }

    fn set_color(&mut self, color: u16) {
        self.color = color;
    }

    fn text_state(&self) -> &TextState {
        &self.text
    }

    fn text_state_mut(&mut self) -> &mut TextState {
        &mut self.text
    }

    fn raw_pixel(&mut self, x: u16, y: u16, color: u16) {
        F::put(self.buffer, self.width, x, y, color);
    }

    fn raw_hline(&mut self, x1: u16, x2: u16, y: u16, color: u16) {
        F::hline(self.buffer, self.width, x1, x2, y, color);
    }

    fn raw_vline(&mut self, x: u16, y1: u16, y2: u16, color: u16) {
        F::vline(self.buffer, self.width, x, y1, y2, color);
    }

    fn raw_fill(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        F::fill(self.buffer, self.width, x1, y1, x2, y2, color);
    }

    fn raw_pages<G>(&mut self, blit: PageBlit, bits: G)
    where
        G: FnMut(u16, u16) -> PageBits,
    {
        F::blit_pages(self.buffer, self.width, self.height, blit, bits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Ssd1306, Ssd1306Variant};
    use crate::font::FONT_6X8;
    use crate::hal::mock::RecordingInterface;
    use hex_literal::hex;

    #[test]
    fn test_construction_checks() {
        let mut small = [0u8; 100];
        assert_eq!(
            PixelSurface::<Mono1>::new(128, 64, &mut small).err(),
            Some(SurfaceError::BufferTooSmall {
                needed: 1024,
                actual: 100
            })
        );
        let mut buf = [0u8; 1024];
        assert_eq!(
            PixelSurface::<Mono1>::new(128, 60, &mut buf).err(),
            Some(SurfaceError::UnalignedHeight(60))
        );
        assert!(PixelSurface::<Rgb332>::new(30, 30, &mut buf).is_ok());
    }

    #[test]
    fn test_out_of_bounds_pixels_untouched() {
        let mut buf = [0u8; 16 * 16 * 2];
        let mut s = PixelSurface::<Rgb565>::new(16, 16, &mut buf).unwrap();
        for &(x, y) in &[(-1, 0), (0, -1), (16, 0), (0, 16), (1000, -1000)] {
            s.put_pixel(x, y);
        }
        assert!(s.buffer().iter().all(|&b| b == 0));
        assert_eq!(s.get_pixel(16, 0), None);
    }

    #[test]
    fn test_clear_put_all_clear() {
        let mut buf = [0u8; 4 * 16];
        let mut s = PixelSurface::<Gray4>::new(8, 16, &mut buf).unwrap();
        s.clear();
        for y in 0..16 {
            for x in 0..8 {
                s.put_pixel(x, y);
            }
        }
        assert!(s.buffer().iter().all(|&b| b == 0xFF));
        s.clear();
        assert!(s.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_then_clear_128x64() {
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        s.fill_rect(0, 0, 127, 63);
        assert!(s.buffer().iter().all(|&b| b == 0xFF));
        s.clear();
        assert_eq!(s.buffer().len(), 1024);
        assert!(s.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rect_equals_four_lines() {
        let mut a_buf = [0u8; 64 * 4];
        let mut b_buf = [0u8; 64 * 4];
        let mut a = PixelSurface::<Mono1>::new(64, 32, &mut a_buf).unwrap();
        let mut b = PixelSurface::<Mono1>::new(64, 32, &mut b_buf).unwrap();
        a.draw_rect(-4, 3, 70, 29);
        b.draw_hline(-4, 3, 70);
        b.draw_hline(-4, 29, 70);
        b.draw_vline(-4, 3, 29);
        b.draw_vline(70, 3, 29);
        assert_eq!(a.buffer(), b.buffer());
    }

    #[test]
    fn test_page_aligned_blit_shifts_one_page() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let sprite = MonoBitmap::new(3, 16, &data);
        let mut a_buf = [0u8; 8 * 4];
        let mut b_buf = [0u8; 8 * 4];
        let mut a = PixelSurface::<Mono1>::new(8, 32, &mut a_buf).unwrap();
        let mut b = PixelSurface::<Mono1>::new(8, 32, &mut b_buf).unwrap();
        a.draw_bitmap1(2, 0, &sprite);
        b.draw_bitmap1(2, 8, &sprite);
        assert_eq!(&a.buffer()[..16], &b.buffer()[8..24]);
        assert_eq!(&b.buffer()[..8], &[0u8; 8]);
        assert_eq!(&a.buffer()[2..5], &data[..3]);
    }

    #[test]
    fn test_unaligned_blit_matches_cropped_reference() {
        let data = [0xF0, 0x0F, 0xAA, 0x55];
        let sprite = MonoBitmap::new(2, 16, &data);
        let mut r_buf = [0u8; 4 * 4];
        let mut reference = PixelSurface::<Mono1>::new(4, 32, &mut r_buf).unwrap();
        reference.draw_bitmap1(0, 8, &sprite);

        let mut s_buf = [0u8; 4 * 2];
        let mut s = PixelSurface::<Mono1>::new(4, 16, &mut s_buf).unwrap();
        s.draw_bitmap1(0, -5, &sprite);
        for y in 0..16 {
            for x in 0..2 {
                let expected = reference.get_pixel(x, y + 8 + 5).unwrap_or(0);
                assert_eq!(s.get_pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_text_needs_font() {
        let mut buf = [0u8; 128];
        let mut s = PixelSurface::<Mono1>::new(64, 16, &mut buf).unwrap();
        assert_eq!(s.print("hi"), 0);
        s.set_font(FontTable::fixed(&FONT_6X8).unwrap());
        assert_eq!(s.print_fixed(0, 0, "abc", FontStyle::Normal), 3);
        assert_eq!(s.cursor(), Point::new(18, 0));
        // 'a' column 1 is 0x20
        assert_eq!(s.buffer()[1], 0x20);
    }

    #[test]
    fn test_color_text_uses_current_color() {
        let mut buf = [0u8; 12 * 8];
        let mut s = PixelSurface::<Rgb332>::new(12, 8, &mut buf).unwrap();
        s.set_font(FontTable::fixed(&FONT_6X8).unwrap());
        s.set_color(0xE0);
        s.print_fixed(0, 0, "|", FontStyle::Normal);
        assert_eq!(s.get_pixel(3, 0), Some(0xE0));
        assert_eq!(s.get_pixel(3, 7), Some(0x00));
        assert_eq!(s.get_pixel(2, 0), Some(0x00));
    }

    #[test]
    fn test_offset_viewport() {
        let mut buf = [0u8; 8];
        let mut s = PixelSurface::<Mono1>::new(8, 8, &mut buf).unwrap();
        s.set_offset(64, 8);
        s.put_pixel(65, 9);
        s.put_pixel(1, 1);
        assert_eq!(s.buffer()[1], 0x02);
        assert_eq!(s.get_pixel(65, 9), Some(1));
        assert_eq!(s.buffer().iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_mono_blt_at_rounds_y_to_page() {
        let mut buf = [0u8; 8];
        let mut s = PixelSurface::<Mono1>::new(8, 8, &mut buf).unwrap();
        s.put_pixel(0, 0);
        let mut oled = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64);
        s.blt_at(&mut oled, 16, 11);
        let intf = oled.release();
        // page 1 starts at row 8, the pixel lands on row 8 rather than 11
        assert_eq!(intf.commands(), hex!("21 10 17 22 01 07").to_vec());
        assert_eq!(intf.data(), hex!("01 00 00 00 00 00 00 00").to_vec());
    }
}
