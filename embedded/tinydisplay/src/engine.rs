//! # Draw Engine
//!
//! Depth-independent drawing algorithms. Everything here is written against
//! the [`PixelSink`] trait and runs unchanged on in-memory surfaces and on
//! direct-to-GDRAM displays.
//!
//! Callers pass coordinates in their own space. The engine subtracts the
//! sink's offset, clips against `[0, width) x [0, height)` and only then
//! reaches the sink's `raw_*` operations, which may assume in-range, ordered
//! arguments.
//!
//! ## Band blits
//!
//! Monochrome sources (sprites, glyphs, XBM images) are streamed to the sink
//! one 8-row band byte at a time. For a destination at row `y` with
//! `shift = y mod 8`, destination band `p` combines:
//!
//! ```text
//!   main  = src[p - y/8]     << shift
//!   carry = src[p - y/8 - 1] >> (8 - shift)
//! ```
//!
//! under a mask that keeps only rows inside both the source and the sink.

use bitflags::bitflags;

use crate::font::{FontTable, MonoBitmap, Utf8Decoder};
use crate::geometry::{clip_span, Point, Rect};

bitflags! {
    /// Text rendering flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextMode: u8 {
        /// Paint set glyph bits only, leave the background untouched
        const TRANSPARENT = 0x01;
        /// Continue on the next line once the cursor passes the right edge
        const WRAP = 0x02;
        /// Wrap, and restart from the top once past the bottom edge
        const WRAP_LOCAL = 0x04;
        /// Negative text: the cell takes the color, glyph pixels stay dark
        const INVERSE = 0x08;
    }
}

/// Glyph rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    /// Every glyph column also carries the column to its left
    Bold,
}

/// Cursor and text settings carried by every sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextState {
    pub cursor: Point,
    pub mode: TextMode,
    pub style: FontStyle,
    /// Partial UTF-8 sequence between `write` calls
    pub decoder: Utf8Decoder,
}

/// One destination band byte of a monochrome blit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageBits {
    /// Source pixels, LSB at the top row of the band
    pub data: u8,
    /// Rows of the band covered by the source
    pub mask: u8,
}

/// Destination window of a band blit, already clipped to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBlit {
    pub x: u16,
    /// First destination band (`row / 8`)
    pub page: u16,
    pub width: u16,
    pub pages: u16,
    /// Clear bits leave the destination untouched
    pub transparent: bool,
    pub color: u16,
}

/// Low-level target of the draw engine.
///
/// `raw_*` arguments are sink-local, ordered (`x1 <= x2`, `y1 <= y2`) and
/// inside the sink. Colors are in the sink's native encoding.
pub trait PixelSink {
    fn width(&self) -> u16;
    fn height(&self) -> u16;

    /// Position of the sink's top-left corner in caller coordinates
    fn offset(&self) -> Point {
        Point::ORIGIN
    }

    fn color(&self) -> u16;
    fn set_color(&mut self, color: u16);

    fn text_state(&self) -> &TextState;
    fn text_state_mut(&mut self) -> &mut TextState;

    fn raw_pixel(&mut self, x: u16, y: u16, color: u16);
    fn raw_hline(&mut self, x1: u16, x2: u16, y: u16, color: u16);
    fn raw_vline(&mut self, x: u16, y1: u16, y2: u16, color: u16);
    fn raw_fill(&mut self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16);

    /// Streams a band blit. `bits(col, band)` yields the source for column
    /// `blit.x + col` of band `blit.page + band`; the mask depends on the band
    /// only.
    fn raw_pages<G>(&mut self, blit: PageBlit, bits: G)
    where
        G: FnMut(u16, u16) -> PageBits;
}

#[inline]
fn to_local<S: PixelSink + ?Sized>(sink: &S, x: i32, y: i32) -> (i32, i32) {
    let origin = sink.offset();
    (x.saturating_sub(origin.x), y.saturating_sub(origin.y))
}

/// Sets one pixel to the current color
pub fn put_pixel<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y: i32) {
    let (x, y) = to_local(sink, x, y);
    if x < 0 || y < 0 || x >= sink.width() as i32 || y >= sink.height() as i32 {
        return;
    }
    let color = sink.color();
    sink.raw_pixel(x as u16, y as u16, color);
}

/// Horizontal line from `x1` to `x2` inclusive
pub fn draw_hline<S: PixelSink + ?Sized>(sink: &mut S, x1: i32, y: i32, x2: i32) {
    let (x1, y) = to_local(sink, x1, y);
    let (x2, _) = to_local(sink, x2, 0);
    if y < 0 || y >= sink.height() as i32 {
        return;
    }
    if let Some((a, b)) = clip_span(x1, x2, sink.width()) {
        let color = sink.color();
        sink.raw_hline(a, b, y as u16, color);
    }
}

/// Vertical line from `y1` to `y2` inclusive
pub fn draw_vline<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y1: i32, y2: i32) {
    let (x, y1) = to_local(sink, x, y1);
    let (_, y2) = to_local(sink, 0, y2);
    if x < 0 || x >= sink.width() as i32 {
        return;
    }
    if let Some((a, b)) = clip_span(y1, y2, sink.height()) {
        let color = sink.color();
        sink.raw_vline(x as u16, a, b, color);
    }
}

/// Bresenham line, one pixel per step along the major axis.
///
/// Only the part of the major axis inside the sink is walked. The minor
/// coordinate of step `k` is `k * d_minor / d_major` rounded half up, which
/// is where the incremental error term lands after `k` steps.
pub fn draw_line<S: PixelSink + ?Sized>(sink: &mut S, x1: i32, y1: i32, x2: i32, y2: i32) {
    if y1 == y2 {
        return draw_hline(sink, x1, y1, x2);
    }
    if x1 == x2 {
        return draw_vline(sink, x1, y1, y2);
    }
    let origin = sink.offset();
    let local = |x: i32, y: i32| (x as i64 - origin.x as i64, y as i64 - origin.y as i64);
    let (mut a, mut b) = (local(x1, y1), local(x2, y2));
    let steep = (b.1 - a.1).abs() > (b.0 - a.0).abs();
    let (major_len, minor_len) = if steep {
        a = (a.1, a.0);
        b = (b.1, b.0);
        (sink.height() as i64, sink.width() as i64)
    } else {
        (sink.width() as i64, sink.height() as i64)
    };
    if a.0 > b.0 {
        core::mem::swap(&mut a, &mut b);
    }

    let d_major = (b.0 - a.0) as i128;
    let d_minor = (b.1 - a.1).abs() as i128;
    let step = if a.1 < b.1 { 1 } else { -1 };
    let color = sink.color();
    for major in a.0.max(0)..=b.0.min(major_len - 1) {
        let k = (major - a.0) as i128;
        let minor = a.1 + step * ((2 * k * d_minor + d_major) / (2 * d_major)) as i64;
        if minor < 0 || minor >= minor_len {
            continue;
        }
        let (x, y) = if steep { (minor, major) } else { (major, minor) };
        sink.raw_pixel(x as u16, y as u16, color);
    }
}

/// Rectangle outline made of four clipped lines
pub fn draw_rect<S: PixelSink + ?Sized>(sink: &mut S, x1: i32, y1: i32, x2: i32, y2: i32) {
    draw_hline(sink, x1, y1, x2);
    draw_hline(sink, x1, y2, x2);
    draw_vline(sink, x1, y1, y2);
    draw_vline(sink, x2, y1, y2);
}

fn fill_with<S: PixelSink + ?Sized>(sink: &mut S, area: Rect, color: u16) {
    let origin = sink.offset();
    let local = area
        .normalized()
        .translate(origin.x.saturating_neg(), origin.y.saturating_neg());
    let bounds = Rect::with_size(sink.width(), sink.height());
    if let Some(r) = local.intersect(&bounds) {
        sink.raw_fill(
            r.p1.x as u16,
            r.p1.y as u16,
            r.p2.x as u16,
            r.p2.y as u16,
            color,
        );
    }
}

/// Filled rectangle in the current color
pub fn fill_rect<S: PixelSink + ?Sized>(sink: &mut S, x1: i32, y1: i32, x2: i32, y2: i32) {
    let color = sink.color();
    fill_with(sink, Rect::new(x1, y1, x2, y2), color);
}

/// Resets a rectangle to the background (color 0)
pub fn clear_rect<S: PixelSink + ?Sized>(sink: &mut S, x1: i32, y1: i32, x2: i32, y2: i32) {
    fill_with(sink, Rect::new(x1, y1, x2, y2), 0);
}

/// Band blit of a `w` x `h` monochrome source placed at `(x, y)`.
///
/// `source(col, band)` returns the source byte of a column within a band and
/// must read zero outside the source.
fn blit_bands<S, F>(sink: &mut S, x: i32, y: i32, w: u16, h: u16, transparent: bool, source: F)
where
    S: PixelSink + ?Sized,
    F: Fn(u16, u16) -> u8,
{
    let (x, y) = to_local(sink, x, y);
    let top = y.max(0);
    let bottom = y.saturating_add(h as i32).min(sink.height() as i32);
    let left = x.max(0);
    let right = x.saturating_add(w as i32).min(sink.width() as i32);
    if top >= bottom || left >= right {
        return;
    }

    let shift = y.rem_euclid(8) as u32;
    let base = y.div_euclid(8);
    let first_page = top >> 3;
    let last_page = (bottom - 1) >> 3;
    let skip = left - x;
    let blit = PageBlit {
        x: left as u16,
        page: first_page as u16,
        width: (right - left) as u16,
        pages: (last_page - first_page + 1) as u16,
        transparent,
        color: sink.color(),
    };

    sink.raw_pages(blit, |col, band| {
        let page = first_page + band as i32;
        let src_col = (skip + col as i32) as u16;
        let read = |p: i32| if p < 0 { 0 } else { source(src_col, p as u16) };

        let main = page - base;
        let mut data = read(main) << shift;
        if shift > 0 {
            data |= read(main - 1) >> (8 - shift);
        }

        let row0 = page * 8;
        let lo = top.max(row0) - row0;
        let hi = bottom.min(row0 + 8) - row0;
        let mask = (((1u16 << hi) - 1) as u8) & !(((1u16 << lo) - 1) as u8);
        PageBits { data, mask }
    });
}

/// Blits a page-ordered 1bpp bitmap at any `y`, honoring the transparent flag
pub fn draw_bitmap1<S: PixelSink + ?Sized>(sink: &mut S, x: i32, y: i32, bitmap: &MonoBitmap) {
    let transparent = sink.text_state().mode.contains(TextMode::TRANSPARENT);
    blit_bands(sink, x, y, bitmap.width(), bitmap.height(), transparent, |col, page| {
        bitmap.byte(col, page)
    });
}

/// Blits an XBM image: rows of `ceil(w / 8)` bytes, LSB is the leftmost pixel
pub fn draw_xbitmap1<S: PixelSink + ?Sized>(
    sink: &mut S,
    x: i32,
    y: i32,
    w: u16,
    h: u16,
    bits: &[u8],
) {
    let pitch = (w as usize + 7) / 8;
    let transparent = sink.text_state().mode.contains(TextMode::TRANSPARENT);
    blit_bands(sink, x, y, w, h, transparent, |col, page| {
        let mut byte = 0u8;
        for bit in 0..8u16 {
            let row = page * 8 + bit;
            if col >= w || row >= h {
                break;
            }
            let src = bits.get(row as usize * pitch + col as usize / 8).copied().unwrap_or(0);
            if src & (1 << (col & 7)) != 0 {
                byte |= 1 << bit;
            }
        }
        byte
    });
}

fn new_line<S: PixelSink + ?Sized>(sink: &mut S, font: &FontTable) {
    let state = sink.text_state_mut();
    state.cursor.x = 0;
    state.cursor.y = state.cursor.y.saturating_add(font.height() as i32);
}

/// Source bytes of a glyph bitmap; bold ORs in the column to its left
/// without growing the glyph
fn glyph_source<'a>(bitmap: MonoBitmap<'a>, bold: bool) -> impl Fn(u16, u16) -> u8 + 'a {
    move |col: u16, page: u16| {
        let byte = bitmap.byte(col, page);
        if bold && col > 0 {
            byte | bitmap.byte(col - 1, page)
        } else {
            byte
        }
    }
}

/// Source enlarged `1 << factor` times on both axes
fn scaled_source<F: Fn(u16, u16) -> u8>(source: F, factor: u8) -> impl Fn(u16, u16) -> u8 {
    move |col: u16, page: u16| {
        if factor == 0 {
            return source(col, page);
        }
        let col = col >> factor;
        let mut byte = 0u8;
        for bit in 0..8u16 {
            let row = (page * 8 + bit) >> factor;
            if source(col, row >> 3) & (1 << (row & 7)) != 0 {
                byte |= 1 << bit;
            }
        }
        byte
    }
}

/// Negative text reads the glyph inverted; rows outside the glyph are
/// masked off by the blit
fn inverse_source<F: Fn(u16, u16) -> u8>(source: F, inverse: bool) -> impl Fn(u16, u16) -> u8 {
    move |col: u16, page: u16| if inverse { !source(col, page) } else { source(col, page) }
}

/// Clears or fills the cell behind a glyph, then blits it scaled by
/// `1 << factor`. Returns the cursor advance.
fn draw_glyph<S: PixelSink + ?Sized>(
    sink: &mut S,
    font: &FontTable,
    code: u16,
    at: Point,
    style: FontStyle,
    factor: u8,
) -> i32 {
    let mode = sink.text_state().mode;
    let transparent = mode.contains(TextMode::TRANSPARENT);
    let inverse = mode.contains(TextMode::INVERSE);
    let glyph = font.glyph(code);
    let advance = glyph.advance() << factor;
    let line = (font.height() as i32) << factor;
    if !transparent && advance > 0 {
        let cell = Rect::new(
            at.x,
            at.y,
            at.x.saturating_add(advance - 1),
            at.y.saturating_add(line - 1),
        );
        let background = if inverse { sink.color() } else { 0 };
        fill_with(sink, cell, background);
    }

    let bitmap = glyph.bitmap;
    let source = inverse_source(
        scaled_source(glyph_source(bitmap, style == FontStyle::Bold), factor),
        inverse,
    );
    blit_bands(
        sink,
        at.x,
        at.y,
        bitmap.width() << factor,
        bitmap.height() << factor,
        transparent,
        source,
    );
    advance
}

/// Draws one code point at the cursor and advances it
pub fn print_char<S: PixelSink + ?Sized>(sink: &mut S, font: &FontTable, code: u16) {
    let width = sink.width() as i32;
    let height = sink.height() as i32;
    let state = *sink.text_state();
    if state.mode.intersects(TextMode::WRAP | TextMode::WRAP_LOCAL)
        && state.cursor.x > width - font.width() as i32
    {
        new_line(sink, font);
        let state = sink.text_state_mut();
        if state.mode.contains(TextMode::WRAP_LOCAL)
            && state.cursor.y > height - font.height() as i32
        {
            state.cursor.y = 0;
        }
    }

    let cursor = sink.text_state().cursor;
    let advance = draw_glyph(sink, font, code, cursor, state.style, 0);
    let state = sink.text_state_mut();
    state.cursor.x = state.cursor.x.saturating_add(advance);
}

/// Feeds one byte of UTF-8 text.
///
/// Returns 1 when the byte completed a character or a control code, 0 while
/// a multi-byte sequence is still pending.
pub fn write<S: PixelSink + ?Sized>(sink: &mut S, font: &FontTable, byte: u8) -> usize {
    match byte {
        b'\n' => {
            sink.text_state_mut().decoder.reset();
            new_line(sink, font);
            1
        }
        b'\r' => 1,
        _ => match sink.text_state_mut().decoder.push(byte) {
            Some(code) => {
                print_char(sink, font, code);
                1
            }
            None => 0,
        },
    }
}

/// Writes a whole string at the cursor
pub fn print<S: PixelSink + ?Sized>(sink: &mut S, font: &FontTable, text: &str) -> usize {
    text.bytes().map(|b| write(sink, font, b)).sum()
}

/// Moves the cursor to `(x, y)`, selects `style` and prints `text`
pub fn print_fixed<S: PixelSink + ?Sized>(
    sink: &mut S,
    font: &FontTable,
    x: i32,
    y: i32,
    text: &str,
    style: FontStyle,
) -> usize {
    let state = sink.text_state_mut();
    state.cursor = Point::new(x, y);
    state.style = style;
    state.decoder.reset();
    print(sink, font, text)
}

/// Largest supported text scale: `1 << 3` = 8 times
pub const MAX_SCALE: u8 = 3;

/// Prints `text` at `(x, y)` with every glyph pixel enlarged to a
/// `2^factor` square. A character that would cross the right edge starts a
/// new line at `x`; `'\n'` does the same. `factor` is capped at
/// [`MAX_SCALE`].
pub fn print_fixed_n<S: PixelSink + ?Sized>(
    sink: &mut S,
    font: &FontTable,
    x: i32,
    y: i32,
    text: &str,
    style: FontStyle,
    factor: u8,
) -> usize {
    let factor = factor.min(MAX_SCALE);
    let cell = (font.width() as i32) << factor;
    let line = (font.height() as i32) << factor;
    let limit = sink.width() as i32 - cell;
    {
        let state = sink.text_state_mut();
        state.cursor = Point::new(x, y);
        state.style = style;
        state.decoder.reset();
    }

    let mut count = 0;
    for byte in text.bytes() {
        let code = match byte {
            b'\n' => {
                let state = sink.text_state_mut();
                state.decoder.reset();
                state.cursor = Point::new(x, state.cursor.y.saturating_add(line));
                count += 1;
                continue;
            }
            b'\r' => {
                count += 1;
                continue;
            }
            _ => match sink.text_state_mut().decoder.push(byte) {
                Some(code) => code,
                None => continue,
            },
        };
        let mut cursor = sink.text_state().cursor;
        if cursor.x > limit {
            cursor = Point::new(x, cursor.y.saturating_add(line));
        }
        let advance = draw_glyph(sink, font, code, cursor, style, factor);
        sink.text_state_mut().cursor = Point::new(cursor.x.saturating_add(advance), cursor.y);
        count += 1;
    }
    count
}
