//! Packed pixel encodings.
//!
//! | Format | Bits | Layout |
//! |--------|------|--------|
//! | `Mono1`  | 1  | page-major, byte = 8 vertical pixels, LSB on top |
//! | `Gray4`  | 4  | row-major, even `x` in the low nibble |
//! | `Rgb332` | 8  | row-major, one byte per pixel |
//! | `Rgb565` | 16 | row-major, big-endian word per pixel |

use crate::device::{DeviceAdapter, LcdMode};
use crate::engine::{PageBits, PageBlit};

/// Storage strategy of a [`PixelSurface`](super::PixelSurface).
///
/// All coordinates handed to these functions are already clipped to the
/// surface, and `buf` is at least [`buffer_len`](Self::buffer_len) bytes.
pub trait PixelFormat {
    const BITS: u8;
    const NAME: &'static str;
    /// Adapter mode `flush` expects
    const MODE: LcdMode;

    fn buffer_len(width: u16, height: u16) -> usize;

    /// Whether the format can pack a surface of this height
    fn height_supported(height: u16) -> bool {
        let _ = height;
        true
    }

    fn put(buf: &mut [u8], width: u16, x: u16, y: u16, color: u16);
    fn get(buf: &[u8], width: u16, x: u16, y: u16) -> u16;

    fn hline(buf: &mut [u8], width: u16, x1: u16, x2: u16, y: u16, color: u16) {
        for x in x1..=x2 {
            Self::put(buf, width, x, y, color);
        }
    }

    fn vline(buf: &mut [u8], width: u16, x: u16, y1: u16, y2: u16, color: u16) {
        for y in y1..=y2 {
            Self::put(buf, width, x, y, color);
        }
    }

    fn fill(buf: &mut [u8], width: u16, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        for y in y1..=y2 {
            Self::hline(buf, width, x1, x2, y, color);
        }
    }

    /// Band blit expanded to single pixels: set bits paint `color`, clear
    /// bits paint 0 unless the blit is transparent.
    fn blit_pages<G>(buf: &mut [u8], width: u16, height: u16, blit: PageBlit, mut bits: G)
    where
        G: FnMut(u16, u16) -> PageBits,
    {
        for band in 0..blit.pages {
            for col in 0..blit.width {
                let b = bits(col, band);
                for row in 0..8u16 {
                    let y = (blit.page + band) * 8 + row;
                    if y >= height || b.mask & (1 << row) == 0 {
                        continue;
                    }
                    let x = blit.x + col;
                    if b.data & (1 << row) != 0 {
                        Self::put(buf, width, x, y, blit.color);
                    } else if !blit.transparent {
                        Self::put(buf, width, x, y, 0);
                    }
                }
            }
        }
    }

    /// Sends the `width` x `height` buffer to the adapter with its top-left
    /// corner at `(x, y)`, cropped to the display.
    fn flush<A: DeviceAdapter>(buf: &[u8], width: u16, height: u16, x: u16, y: u16, adapter: &mut A);
}

/// Visible part of a tile placed at `(x, y)` on a `dw` x `dh` display
fn visible(width: u16, height: u16, x: u16, y: u16, dw: u16, dh: u16) -> Option<(u16, u16)> {
    if x >= dw || y >= dh {
        return None;
    }
    let w = width.min(dw - x);
    let h = height.min(dh - y);
    if w == 0 || h == 0 {
        None
    } else {
        Some((w, h))
    }
}

/// Row-major flush shared by the color formats
fn flush_rows<A, P>(width: u16, height: u16, x: u16, y: u16, adapter: &mut A, mut pixel: P)
where
    A: DeviceAdapter,
    P: FnMut(&mut crate::device::Block<'_, A>, u16, u16),
{
    let info = adapter.info();
    let Some((w, h)) = visible(width, height, x, y, info.width, info.height) else {
        return;
    };
    let mut block = adapter.set_block(x, y, w);
    for row in 0..h {
        for col in 0..w {
            pixel(&mut block, col, row);
        }
    }
}

/// 1 bit per pixel, page-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mono1;

impl Mono1 {
    #[inline]
    fn apply(byte: &mut u8, mask: u8, color: u16) {
        if color != 0 {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Rows `lo..=hi` (both within one band) as a bit mask
    #[inline]
    fn band_mask(lo: u16, hi: u16) -> u8 {
        let top = 0xFFu8 << (lo & 7);
        let bottom = 0xFFu8 >> (7 - (hi & 7));
        top & bottom
    }
}

impl PixelFormat for Mono1 {
    const BITS: u8 = 1;
    const NAME: &'static str = "mono1";
    const MODE: LcdMode = LcdMode::Compatible;

    fn buffer_len(width: u16, height: u16) -> usize {
        width as usize * ((height as usize + 7) >> 3)
    }

    fn height_supported(height: u16) -> bool {
        height % 8 == 0
    }

    fn put(buf: &mut [u8], width: u16, x: u16, y: u16, color: u16) {
        let idx = (y >> 3) as usize * width as usize + x as usize;
        Self::apply(&mut buf[idx], 1 << (y & 7), color);
    }

    fn get(buf: &[u8], width: u16, x: u16, y: u16) -> u16 {
        let idx = (y >> 3) as usize * width as usize + x as usize;
        ((buf[idx] >> (y & 7)) & 1) as u16
    }

    fn hline(buf: &mut [u8], width: u16, x1: u16, x2: u16, y: u16, color: u16) {
        let row = (y >> 3) as usize * width as usize;
        let mask = 1 << (y & 7);
        for byte in &mut buf[row + x1 as usize..=row + x2 as usize] {
            Self::apply(byte, mask, color);
        }
    }

    fn vline(buf: &mut [u8], width: u16, x: u16, y1: u16, y2: u16, color: u16) {
        // head mask, whole bytes, tail mask
        let mut y = y1;
        while y <= y2 {
            let last = y2.min(y | 7);
            let idx = (y >> 3) as usize * width as usize + x as usize;
            Self::apply(&mut buf[idx], Self::band_mask(y, last), color);
            y = last + 1;
        }
    }

    fn fill(buf: &mut [u8], width: u16, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) {
        let mut y = y1;
        while y <= y2 {
            let last = y2.min(y | 7);
            let mask = Self::band_mask(y, last);
            let row = (y >> 3) as usize * width as usize;
            for byte in &mut buf[row + x1 as usize..=row + x2 as usize] {
                Self::apply(byte, mask, color);
            }
            y = last + 1;
        }
    }

    fn blit_pages<G>(buf: &mut [u8], width: u16, height: u16, blit: PageBlit, mut bits: G)
    where
        G: FnMut(u16, u16) -> PageBits,
    {
        let pages = (height + 7) >> 3;
        for band in 0..blit.pages {
            let page = blit.page + band;
            if page >= pages {
                break;
            }
            let row = page as usize * width as usize;
            for col in 0..blit.width {
                let PageBits { data, mask } = bits(col, band);
                let byte = &mut buf[row + (blit.x + col) as usize];
                if blit.transparent {
                    Self::apply(byte, data & mask, blit.color);
                } else {
                    let pixels = if blit.color != 0 { data } else { !data };
                    *byte = (*byte & !mask) | (pixels & mask);
                }
            }
        }
    }

    fn flush<A: DeviceAdapter>(buf: &[u8], width: u16, height: u16, x: u16, y: u16, adapter: &mut A) {
        let info = adapter.info();
        let Some((w, h)) = visible(width, height, x, y, info.width, info.height) else {
            return;
        };
        let pages = (h + 7) >> 3;
        let mut block = adapter.set_block(x, y >> 3, w);
        for page in 0..pages {
            let start = page as usize * width as usize;
            block.send_pixels_buffer1(&buf[start..start + w as usize]);
            if page + 1 < pages {
                block.next_page();
            }
        }
    }
}

/// 4-bit grayscale, two pixels per byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gray4;

impl Gray4 {
    #[inline]
    fn index(width: u16, x: u16, y: u16) -> usize {
        y as usize * ((width as usize + 1) >> 1) + (x >> 1) as usize
    }
}

impl PixelFormat for Gray4 {
    const BITS: u8 = 4;
    const NAME: &'static str = "gray4";
    const MODE: LcdMode = LcdMode::Normal;

    fn buffer_len(width: u16, height: u16) -> usize {
        ((width as usize + 1) >> 1) * height as usize
    }

    fn put(buf: &mut [u8], width: u16, x: u16, y: u16, color: u16) {
        let byte = &mut buf[Self::index(width, x, y)];
        let level = (color & 0x0F) as u8;
        if x & 1 == 0 {
            *byte = (*byte & 0xF0) | level;
        } else {
            *byte = (*byte & 0x0F) | (level << 4);
        }
    }

    fn get(buf: &[u8], width: u16, x: u16, y: u16) -> u16 {
        let byte = buf[Self::index(width, x, y)];
        if x & 1 == 0 {
            (byte & 0x0F) as u16
        } else {
            (byte >> 4) as u16
        }
    }

    fn flush<A: DeviceAdapter>(buf: &[u8], width: u16, height: u16, x: u16, y: u16, adapter: &mut A) {
        flush_rows(width, height, x, y, adapter, |block, col, row| {
            block.send_pixels8(Self::get(buf, width, col, row) as u8);
        });
    }
}

/// 8-bit RGB332
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb332;

impl PixelFormat for Rgb332 {
    const BITS: u8 = 8;
    const NAME: &'static str = "rgb332";
    const MODE: LcdMode = LcdMode::Normal;

    fn buffer_len(width: u16, height: u16) -> usize {
        width as usize * height as usize
    }

    fn put(buf: &mut [u8], width: u16, x: u16, y: u16, color: u16) {
        buf[y as usize * width as usize + x as usize] = color as u8;
    }

    fn get(buf: &[u8], width: u16, x: u16, y: u16) -> u16 {
        buf[y as usize * width as usize + x as usize] as u16
    }

    fn hline(buf: &mut [u8], width: u16, x1: u16, x2: u16, y: u16, color: u16) {
        let row = y as usize * width as usize;
        buf[row + x1 as usize..=row + x2 as usize].fill(color as u8);
    }

    fn flush<A: DeviceAdapter>(buf: &[u8], width: u16, height: u16, x: u16, y: u16, adapter: &mut A) {
        flush_rows(width, height, x, y, adapter, |block, col, row| {
            block.send_pixels8(Self::get(buf, width, col, row) as u8);
        });
    }
}

/// 16-bit RGB565, stored big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb565;

impl PixelFormat for Rgb565 {
    const BITS: u8 = 16;
    const NAME: &'static str = "rgb565";
    const MODE: LcdMode = LcdMode::Normal;

    fn buffer_len(width: u16, height: u16) -> usize {
        width as usize * height as usize * 2
    }

    fn put(buf: &mut [u8], width: u16, x: u16, y: u16, color: u16) {
        let idx = (y as usize * width as usize + x as usize) * 2;
        buf[idx..idx + 2].copy_from_slice(&color.to_be_bytes());
    }

    fn get(buf: &[u8], width: u16, x: u16, y: u16) -> u16 {
        let idx = (y as usize * width as usize + x as usize) * 2;
        u16::from_be_bytes([buf[idx], buf[idx + 1]])
    }

    fn flush<A: DeviceAdapter>(buf: &[u8], width: u16, height: u16, x: u16, y: u16, adapter: &mut A) {
        flush_rows(width, height, x, y, adapter, |block, col, row| {
            block.send_pixels16(Self::get(buf, width, col, row));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_lengths() {
        assert_eq!(Mono1::buffer_len(128, 64), 1024);
        assert_eq!(Gray4::buffer_len(5, 2), 6);
        assert_eq!(Rgb332::buffer_len(96, 64), 6144);
        assert_eq!(Rgb565::buffer_len(10, 10), 200);
    }

    #[test]
    fn test_mono_vline_head_body_tail() {
        let mut buf = [0u8; 3];
        Mono1::vline(&mut buf, 1, 0, 3, 20, 1);
        assert_eq!(buf, [0xF8, 0xFF, 0x1F]);
        Mono1::vline(&mut buf, 1, 0, 9, 10, 0);
        assert_eq!(buf, [0xF8, 0xF9, 0x1F]);
    }

    #[test]
    fn test_mono_band_mask() {
        assert_eq!(Mono1::band_mask(0, 7), 0xFF);
        assert_eq!(Mono1::band_mask(3, 3), 0x08);
        assert_eq!(Mono1::band_mask(10, 13), 0x3C);
    }

    #[test]
    fn test_gray4_nibble_order() {
        let mut buf = [0u8; 2];
        Gray4::put(&mut buf, 3, 0, 0, 0x0A);
        Gray4::put(&mut buf, 3, 1, 0, 0x05);
        Gray4::put(&mut buf, 3, 2, 0, 0x0F);
        assert_eq!(buf, [0x5A, 0x0F]);
        assert_eq!(Gray4::get(&buf, 3, 1, 0), 0x05);
    }

    #[test]
    fn test_rgb565_big_endian() {
        let mut buf = [0u8; 4];
        Rgb565::put(&mut buf, 2, 1, 0, 0xF81F);
        assert_eq!(buf, [0x00, 0x00, 0xF8, 0x1F]);
        assert_eq!(Rgb565::get(&buf, 2, 1, 0), 0xF81F);
    }

    #[test]
    fn test_mono_opaque_blit_merge() {
        let mut buf = [0b1010_1010u8];
        let blit = PageBlit {
            x: 0,
            page: 0,
            width: 1,
            pages: 1,
            transparent: false,
            color: 1,
        };
        Mono1::blit_pages(&mut buf, 1, 8, blit, |_, _| PageBits {
            data: 0b0000_0101,
            mask: 0b0000_1111,
        });
        assert_eq!(buf, [0b1010_0101]);

        let transparent = PageBlit {
            transparent: true,
            ..blit
        };
        Mono1::blit_pages(&mut buf, 1, 8, transparent, |_, _| PageBits {
            data: 0b0001_1010,
            mask: 0b0001_1111,
        });
        assert_eq!(buf, [0b1011_1111]);
    }

    #[test]
    fn test_visible_crop() {
        assert_eq!(visible(32, 16, 120, 60, 128, 64), Some((8, 4)));
        assert_eq!(visible(32, 16, 128, 0, 128, 64), None);
    }
}
