//! # Font Tables
//!
//! Read-only views over the three glyph table generations found in display
//! firmware, and the glyph/bitmap types the draw engine consumes.
//!
//! ## Table formats
//!
//! | Format | Header | Glyph location |
//! |--------|--------|----------------|
//! | Fixed  | `[0x00, w, h, ascii_offset]` | `(code - ascii_offset) * w * pages` |
//! | Free   | `[0x02, w, h, ascii_offset]` | `{start:u16be, count:u8}` blocks, each followed by `{offset:u16be, bytes:u8, width:u8}` entries and its bitmaps; `count == 0` ends the list |
//! | Squix  | `[w, h, first_char, count]` | `{offset:u16be, bytes:u8, width:u8}` entries, `0xFFFF` = no glyph, column-major bitmaps |
//!
//! Lookups never fail: an unknown code point resolves to the fallback glyph of
//! the table (the `ascii_offset` / `first_char` glyph), and malformed data reads
//! as blank pixels rather than out of bounds.

pub mod builtin;
pub mod utf8;

pub use builtin::FONT_6X8;
pub use utf8::Utf8Decoder;

use core::fmt;

/// Format tag byte of legacy fixed tables
pub const FIXED_FONT_TAG: u8 = 0x00;
/// Format tag byte of variable-width unicode tables
pub const FREE_FONT_TAG: u8 = 0x02;

const HEADER_LEN: usize = 4;
const JUMP_ENTRY_LEN: usize = 4;
const BLOCK_HEADER_LEN: usize = 3;
const SQUIX_NO_GLYPH: u16 = 0xFFFF;

/// Byte order of a monochrome bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapLayout {
    /// Page-major: `width` bytes per 8-pixel band, band after band
    Pages,
    /// Column-major: `pages` bytes per column, column after column
    Columns,
}

/// 1bpp bitmap, 8 vertical pixels per byte with the LSB on top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonoBitmap<'a> {
    data: &'a [u8],
    width: u16,
    height: u16,
    layout: BitmapLayout,
}

impl<'a> MonoBitmap<'a> {
    /// Page-major bitmap, the layout of sprites and legacy glyphs
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            data,
            width,
            height,
            layout: BitmapLayout::Pages,
        }
    }

    /// Column-major bitmap, the layout of squix glyphs
    pub const fn columns(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            data,
            width,
            height,
            layout: BitmapLayout::Columns,
        }
    }

    pub const fn empty() -> Self {
        Self::new(0, 0, &[])
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn layout(&self) -> BitmapLayout {
        self.layout
    }

    /// Number of 8-pixel bands
    pub fn pages(&self) -> u16 {
        (self.height + 7) >> 3
    }

    /// Source byte for column `col` of band `page`.
    ///
    /// Anything outside the bitmap, past the end of the data, or below the
    /// last pixel row reads as zero.
    pub fn byte(&self, col: u16, page: u16) -> u8 {
        let pages = self.pages();
        if col >= self.width || page >= pages {
            return 0;
        }
        let index = match self.layout {
            BitmapLayout::Pages => page as usize * self.width as usize + col as usize,
            BitmapLayout::Columns => col as usize * pages as usize + page as usize,
        };
        let byte = self.data.get(index).copied().unwrap_or(0);
        let rows_left = self.height - page * 8;
        if rows_left < 8 {
            byte & ((1u8 << rows_left) - 1)
        } else {
            byte
        }
    }

    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if y >= self.height {
            return false;
        }
        self.byte(x, y >> 3) & (1 << (y & 7)) != 0
    }
}

/// One resolved character: metrics plus a view on its bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub width: u8,
    pub height: u8,
    /// Extra blank columns after the bitmap before the next glyph
    pub spacing: u8,
    pub bitmap: MonoBitmap<'a>,
}

impl<'a> Glyph<'a> {
    /// Horizontal cursor advance
    pub fn advance(&self) -> i32 {
        self.width as i32 + self.spacing as i32
    }
}

/// Glyph table generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    /// Legacy fixed-width table
    Fixed,
    /// Variable-width table with sparse unicode blocks
    Free,
    /// Fixed-range table with a flat jump table
    Squix,
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFormat::Fixed => write!(f, "fixed"),
            FontFormat::Free => write!(f, "free"),
            FontFormat::Squix => write!(f, "squix"),
        }
    }
}

/// Font table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontError {
    /// Fewer bytes than the header or jump table needs
    Truncated,
    /// First header byte does not match the requested format
    BadFormatTag(u8),
    /// Header declares a zero glyph width or height
    EmptyMetrics,
    /// Secondary tables must be free-format
    NotUnicode,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Truncated => write!(f, "font table is truncated"),
            FontError::BadFormatTag(tag) => write!(f, "unexpected font format tag 0x{:02x}", tag),
            FontError::EmptyMetrics => write!(f, "font declares zero glyph width or height"),
            FontError::NotUnicode => write!(f, "secondary font table must be free-format"),
        }
    }
}

/// Immutable view of a glyph table living in flash or any byte slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontTable<'a> {
    format: FontFormat,
    width: u8,
    height: u8,
    /// Fallback code point; `first_char` for squix tables
    ascii_offset: u8,
    /// Glyph count of squix tables
    count: u8,
    /// Everything after the header
    data: &'a [u8],
    /// Block list of a free-format table consulted for misses
    secondary: Option<&'a [u8]>,
}

impl<'a> FontTable<'a> {
    /// Parses the header of `bytes` as a table of the given format
    pub fn new(bytes: &'a [u8], format: FontFormat) -> Result<Self, FontError> {
        if bytes.len() < HEADER_LEN {
            log::warn!("font table shorter than its header ({} bytes)", bytes.len());
            return Err(FontError::Truncated);
        }
        let table = match format {
            FontFormat::Fixed | FontFormat::Free => {
                let expected = if format == FontFormat::Fixed {
                    FIXED_FONT_TAG
                } else {
                    FREE_FONT_TAG
                };
                if bytes[0] != expected {
                    log::warn!("font tag 0x{:02x} is not a {} table", bytes[0], format);
                    return Err(FontError::BadFormatTag(bytes[0]));
                }
                Self {
                    format,
                    width: bytes[1],
                    height: bytes[2],
                    ascii_offset: bytes[3],
                    count: 0,
                    data: &bytes[HEADER_LEN..],
                    secondary: None,
                }
            }
            FontFormat::Squix => {
                let count = bytes[3];
                if bytes.len() < HEADER_LEN + count as usize * JUMP_ENTRY_LEN {
                    return Err(FontError::Truncated);
                }
                Self {
                    format,
                    width: bytes[0],
                    height: bytes[1],
                    ascii_offset: bytes[2],
                    count,
                    data: &bytes[HEADER_LEN..],
                    secondary: None,
                }
            }
        };
        if table.width == 0 || table.height == 0 {
            return Err(FontError::EmptyMetrics);
        }
        Ok(table)
    }

    /// Legacy fixed-width table
    pub fn fixed(bytes: &'a [u8]) -> Result<Self, FontError> {
        Self::new(bytes, FontFormat::Fixed)
    }

    /// Variable-width unicode table
    pub fn free(bytes: &'a [u8]) -> Result<Self, FontError> {
        Self::new(bytes, FontFormat::Free)
    }

    /// Squix table
    pub fn squix(bytes: &'a [u8]) -> Result<Self, FontError> {
        Self::new(bytes, FontFormat::Squix)
    }

    /// Attaches a free-format table searched when this one misses
    pub fn with_secondary(mut self, secondary: FontTable<'a>) -> Result<Self, FontError> {
        if secondary.format != FontFormat::Free {
            return Err(FontError::NotUnicode);
        }
        self.secondary = Some(secondary.data);
        Ok(self)
    }

    pub fn format(&self) -> FontFormat {
        self.format
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn ascii_offset(&self) -> u8 {
        self.ascii_offset
    }

    /// Number of 8-pixel bands per glyph
    pub fn pages(&self) -> u8 {
        ((self.height as u16 + 7) >> 3) as u8
    }

    /// Resolves a code point, falling back to the table's default glyph
    pub fn glyph(&self, code: u16) -> Glyph<'a> {
        match self.format {
            FontFormat::Fixed => self.fixed_glyph(code),
            FontFormat::Free => self.free_glyph(code),
            FontFormat::Squix => self.squix_glyph(code),
        }
    }

    fn fixed_glyph(&self, code: u16) -> Glyph<'a> {
        let glyph_size = self.width as usize * self.pages() as usize;
        let mut index = code.wrapping_sub(self.ascii_offset as u16) as usize;
        if code < self.ascii_offset as u16 || (index + 1) * glyph_size > self.data.len() {
            index = 0;
        }
        let start = (index * glyph_size).min(self.data.len());
        let end = (start + glyph_size).min(self.data.len());
        Glyph {
            width: self.width,
            height: self.height,
            spacing: 0,
            bitmap: MonoBitmap::new(self.width as u16, self.height as u16, &self.data[start..end]),
        }
    }

    fn free_glyph(&self, code: u16) -> Glyph<'a> {
        if let Some(glyph) = self.search_blocks(self.data, code) {
            return glyph;
        }
        if let Some(glyph) = self.secondary.and_then(|blocks| self.search_blocks(blocks, code)) {
            return glyph;
        }
        self.search_blocks(self.data, self.ascii_offset as u16)
            .unwrap_or_else(|| self.blank_glyph(self.width / 2))
    }

    /// Walks `{start, count}` block records until one owns `code`
    fn search_blocks(&self, blocks: &'a [u8], code: u16) -> Option<Glyph<'a>> {
        let mut pos = 0usize;
        loop {
            let header = blocks.get(pos..pos + BLOCK_HEADER_LEN)?;
            let start = u16::from_be_bytes([header[0], header[1]]);
            let count = header[2] as u16;
            if count == 0 {
                return None;
            }
            let table = pos + BLOCK_HEADER_LEN;
            let bitmaps = table + count as usize * JUMP_ENTRY_LEN;
            if code >= start && code - start < count {
                let entry = table + (code - start) as usize * JUMP_ENTRY_LEN;
                let (offset, bytes, width) = read_jump_entry(blocks, entry)?;
                let begin = (bitmaps + offset as usize).min(blocks.len());
                let end = (begin + bytes as usize).min(blocks.len());
                if width == 0 {
                    return Some(self.blank_glyph(self.width / 2));
                }
                return Some(Glyph {
                    width,
                    height: self.height,
                    spacing: 1,
                    bitmap: MonoBitmap::new(width as u16, self.height as u16, &blocks[begin..end]),
                });
            }
            let last = table + (count as usize - 1) * JUMP_ENTRY_LEN;
            let (last_offset, last_bytes, _) = read_jump_entry(blocks, last)?;
            pos = bitmaps + last_offset as usize + last_bytes as usize;
        }
    }

    fn squix_glyph(&self, code: u16) -> Glyph<'a> {
        let first = self.ascii_offset as u16;
        let index = if code >= first && code - first < self.count as u16 {
            code - first
        } else {
            0
        };
        let Some((offset, bytes, advance)) =
            read_jump_entry(self.data, index as usize * JUMP_ENTRY_LEN)
        else {
            return self.blank_glyph(self.width / 2);
        };
        if offset == SQUIX_NO_GLYPH {
            return self.blank_glyph(advance);
        }
        let base = self.count as usize * JUMP_ENTRY_LEN;
        let begin = (base + offset as usize).min(self.data.len());
        let end = (begin + bytes as usize).min(self.data.len());
        Glyph {
            width: advance,
            height: self.height,
            spacing: 0,
            bitmap: MonoBitmap::columns(advance as u16, self.height as u16, &self.data[begin..end]),
        }
    }

    /// Zero-width placeholder that still advances the cursor
    fn blank_glyph(&self, spacing: u8) -> Glyph<'a> {
        Glyph {
            width: 0,
            height: self.height,
            spacing,
            bitmap: MonoBitmap::empty(),
        }
    }

    /// Width and height in pixels of `text` laid out on one or more lines
    pub fn text_size(&self, text: &str) -> (u16, u16) {
        let mut decoder = Utf8Decoder::new();
        let mut widest = 0i32;
        let mut line = 0i32;
        let mut lines = 1u16;
        for byte in text.bytes() {
            match byte {
                b'\r' => {}
                b'\n' => {
                    widest = widest.max(line);
                    line = 0;
                    lines += 1;
                }
                _ => {
                    if let Some(code) = decoder.push(byte) {
                        line += self.glyph(code).advance();
                    }
                }
            }
        }
        widest = widest.max(line);
        (widest as u16, lines * self.height as u16)
    }
}

fn read_jump_entry(data: &[u8], at: usize) -> Option<(u16, u8, u8)> {
    let entry = data.get(at..at + JUMP_ENTRY_LEN)?;
    Some((u16::from_be_bytes([entry[0], entry[1]]), entry[2], entry[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Two blocks: 'A'..='B' (3 px wide) and U+0416 (2 px wide, plus a blank entry)
    const FREE_FONT: [u8; 37] = hex!(
        "02 04 08 41"
        "0041 02" "0000 03 03" "0003 03 03" "7f 09 7f" "7f 49 36"
        "0416 02" "0000 02 02" "0002 00 00" "ff 81"
        "0000 00"
    );

    // Covers 'x' and 'y'; 'y' has no glyph
    const SQUIX_FONT: [u8; 14] = hex!(
        "05 08 78 02"
        "0000 02 03" "ffff 00 04"
        "81 42"
    );

    #[test]
    fn test_fixed_lookup_and_fallback() {
        let font = FontTable::fixed(&FONT_6X8).unwrap();
        let a = font.glyph('A' as u16);
        assert_eq!(a.bitmap.byte(1, 0), 0x7C);
        // below the table and past its end both fall back to the space glyph
        let low = font.glyph(0x05);
        let high = font.glyph(0x2000);
        assert_eq!(low.bitmap, font.glyph(' ' as u16).bitmap);
        assert_eq!(high.bitmap, font.glyph(' ' as u16).bitmap);
    }

    #[test]
    fn test_fixed_rejects_bad_headers() {
        assert_eq!(FontTable::fixed(&[0x00, 0x06]), Err(FontError::Truncated));
        assert_eq!(
            FontTable::fixed(&[0x02, 0x06, 0x08, 0x20]),
            Err(FontError::BadFormatTag(0x02))
        );
        assert_eq!(
            FontTable::fixed(&[0x00, 0x00, 0x08, 0x20]),
            Err(FontError::EmptyMetrics)
        );
    }

    #[test]
    fn test_free_block_scan() {
        let font = FontTable::free(&FREE_FONT).unwrap();
        let b = font.glyph('B' as u16);
        assert_eq!(b.width, 3);
        assert_eq!(b.spacing, 1);
        assert_eq!(b.bitmap.byte(2, 0), 0x36);

        // second block is reached by skipping the first block's bitmaps
        let zhe = font.glyph(0x0416);
        assert_eq!(zhe.width, 2);
        assert_eq!(zhe.bitmap.byte(0, 0), 0xFF);
        assert_eq!(zhe.bitmap.byte(1, 0), 0x81);
    }

    #[test]
    fn test_free_blank_and_fallback() {
        let font = FontTable::free(&FREE_FONT).unwrap();
        let blank = font.glyph(0x0417);
        assert_eq!(blank.width, 0);
        assert_eq!(blank.spacing, 2);

        // unknown code points fall back to the ascii_offset glyph ('A')
        let missing = font.glyph(0x1234);
        assert_eq!(missing.bitmap, font.glyph('A' as u16).bitmap);
    }

    #[test]
    fn test_free_secondary_table() {
        let extra: [u8; 16] = hex!("02 04 08 20" "0030 01" "0000 02 02" "aa 55" "0000 00");
        let primary = FontTable::free(&FREE_FONT).unwrap();
        let font = primary.with_secondary(FontTable::free(&extra).unwrap()).unwrap();
        let zero = font.glyph('0' as u16);
        assert_eq!(zero.width, 2);
        assert_eq!(zero.bitmap.byte(0, 0), 0xAA);

        let fixed = FontTable::fixed(&FONT_6X8).unwrap();
        assert_eq!(primary.with_secondary(fixed), Err(FontError::NotUnicode));
    }

    #[test]
    fn test_squix_columns_and_sentinel() {
        let font = FontTable::squix(&SQUIX_FONT).unwrap();
        let x = font.glyph('x' as u16);
        assert_eq!(x.width, 3);
        assert_eq!(x.bitmap.layout(), BitmapLayout::Columns);
        assert_eq!(x.bitmap.byte(0, 0), 0x81);
        assert_eq!(x.bitmap.byte(1, 0), 0x42);
        // truncated glyph data reads as blank
        assert_eq!(x.bitmap.byte(2, 0), 0x00);

        let y = font.glyph('y' as u16);
        assert_eq!(y.width, 0);
        assert_eq!(y.advance(), 4);
    }

    #[test]
    fn test_squix_truncated_jump_table() {
        assert_eq!(FontTable::squix(&hex!("05 08 20 03 0000")), Err(FontError::Truncated));
    }

    #[test]
    fn test_bitmap_masks_rows_below_height() {
        let data = [0xFF, 0xFF];
        let bmp = MonoBitmap::new(1, 11, &data);
        assert_eq!(bmp.pages(), 2);
        assert_eq!(bmp.byte(0, 0), 0xFF);
        assert_eq!(bmp.byte(0, 1), 0x07);
        assert!(bmp.pixel(0, 10));
        assert!(!bmp.pixel(0, 11));
    }

    #[test]
    fn test_text_size() {
        let font = FontTable::fixed(&FONT_6X8).unwrap();
        assert_eq!(font.text_size("abc"), (18, 8));
        assert_eq!(font.text_size("ab\nabcd"), (24, 16));
    }
}
