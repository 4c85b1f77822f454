//! # Colors
//!
//! RGB888 color value plus the fixed packed encodings the controllers use:
//! RGB332 (one byte), RGB565 (two bytes, sent big-endian) and 4-bit gray.

/// RGB color (8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into RGB565 (5 red, 6 green, 5 blue)
    #[inline]
    pub const fn to_rgb565(&self) -> u16 {
        let r5 = (self.r >> 3) as u16;
        let g6 = (self.g >> 2) as u16;
        let b5 = (self.b >> 3) as u16;
        (r5 << 11) | (g6 << 5) | b5
    }

    /// Expand from RGB565, replicating high bits into the low ones
    pub const fn from_rgb565(rgb565: u16) -> Self {
        let r = ((rgb565 >> 11) & 0x1F) as u8;
        let g = ((rgb565 >> 5) & 0x3F) as u8;
        let b = (rgb565 & 0x1F) as u8;
        Self {
            r: (r << 3) | (r >> 2),
            g: (g << 2) | (g >> 4),
            b: (b << 3) | (b >> 2),
        }
    }

    /// Pack into RGB332 (3 red, 3 green, 2 blue)
    #[inline]
    pub const fn to_rgb332(&self) -> u8 {
        (self.r & 0xE0) | ((self.g >> 3) & 0x1C) | (self.b >> 6)
    }

    pub const fn from_rgb332(c: u8) -> Self {
        let r = c >> 5;
        let g = (c >> 2) & 0x07;
        let b = c & 0x03;
        Self {
            r: (r << 5) | (r << 2) | (r >> 1),
            g: (g << 5) | (g << 2) | (g >> 1),
            b: (b << 6) | (b << 4) | (b << 2) | b,
        }
    }

    /// 4-bit gray level from the channel average
    pub const fn to_gray4(&self) -> u8 {
        let sum = self.r as u16 + self.g as u16 + self.b as u16;
        ((sum / 3) >> 4) as u8
    }

    pub const fn from_gray4(level: u8) -> Self {
        let v = (level & 0x0F) * 0x11;
        Self { r: v, g: v, b: v }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
}

/// Widens an RGB332 byte to RGB565 by placing each field at the top of its
/// 565 counterpart. Used by 16-bit controllers fed 8-bit pixels.
#[inline]
pub const fn rgb332_to_rgb565(c: u8) -> u16 {
    let c = c as u16;
    ((c & 0xE0) << 8) | ((c & 0x1C) << 6) | ((c & 0x03) << 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_primaries() {
        assert_eq!(Color::RED.to_rgb565(), 0xF800);
        assert_eq!(Color::GREEN.to_rgb565(), 0x07E0);
        assert_eq!(Color::BLUE.to_rgb565(), 0x001F);
        assert_eq!(Color::from_rgb565(0xFFFF), Color::WHITE);
    }

    #[test]
    fn test_rgb332_primaries() {
        assert_eq!(Color::RED.to_rgb332(), 0xE0);
        assert_eq!(Color::GREEN.to_rgb332(), 0x1C);
        assert_eq!(Color::BLUE.to_rgb332(), 0x03);
        assert_eq!(Color::from_rgb332(0xFF), Color::WHITE);
        assert_eq!(Color::from_rgb332(0x00), Color::BLACK);
    }

    #[test]
    fn test_rgb332_widening() {
        assert_eq!(rgb332_to_rgb565(0xE0), 0xE000);
        assert_eq!(rgb332_to_rgb565(0x1C), 0x0700);
        assert_eq!(rgb332_to_rgb565(0x03), 0x0018);
    }

    #[test]
    fn test_gray4() {
        assert_eq!(Color::WHITE.to_gray4(), 0x0F);
        assert_eq!(Color::BLACK.to_gray4(), 0x00);
        assert_eq!(Color::from_gray4(0x0F), Color::WHITE);
    }
}
