//! Byte-at-a-time UTF-8 decoding into 16-bit code points.

/// One-byte-lookahead decoder for the two-byte UTF-8 range.
///
/// A lead byte `>= 0xC0` is held until the next byte arrives; everything else
/// passes through as-is. Three and four byte sequences are not supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    lead: Option<u8>,
}

impl Utf8Decoder {
    pub const fn new() -> Self {
        Self { lead: None }
    }

    /// Feeds one byte. Returns `None` while more bytes are required.
    pub fn push(&mut self, byte: u8) -> Option<u16> {
        if let Some(lead) = self.lead.take() {
            return Some((((lead & 0x1F) as u16) << 6) | (byte & 0x3F) as u16);
        }
        if byte >= 0xC0 {
            self.lead = Some(byte);
            return None;
        }
        Some(byte as u16)
    }

    /// True while a lead byte is buffered
    pub fn is_pending(&self) -> bool {
        self.lead.is_some()
    }

    pub fn reset(&mut self) {
        self.lead = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut dec = Utf8Decoder::new();
        assert_eq!(dec.push(0x41), Some(0x41));
        assert!(!dec.is_pending());
    }

    #[test]
    fn test_two_byte_sequence() {
        let mut dec = Utf8Decoder::new();
        assert_eq!(dec.push(0xC3), None);
        assert!(dec.is_pending());
        assert_eq!(dec.push(0xA9), Some(0xE9));
        assert!(!dec.is_pending());
    }

    #[test]
    fn test_cyrillic() {
        let mut dec = Utf8Decoder::new();
        let decoded: Vec<u16> = "Жы".bytes().filter_map(|b| dec.push(b)).collect();
        assert_eq!(decoded, vec![0x0416, 0x044B]);
    }
}
