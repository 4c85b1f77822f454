//! Font table inspection

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tinydisplay::font::{FontFormat, FontTable, Glyph, Utf8Decoder, FONT_6X8};

/// Name accepted in place of a path for the compiled-in 6x8 font
pub const BUILTIN_NAME: &str = "builtin";

/// Reads a font table file, or the built-in table for [`BUILTIN_NAME`]
pub fn load_font_bytes(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == BUILTIN_NAME {
        return Ok(FONT_6X8.to_vec());
    }
    fs::read(path).with_context(|| format!("Failed to read font: {}", path.display()))
}

pub fn parse_font(bytes: &[u8], format: FontFormat) -> Result<FontTable<'_>> {
    FontTable::new(bytes, format).map_err(|e| anyhow::anyhow!("{} table: {}", format, e))
}

/// Code points of `text` as the engine decodes them
pub fn code_points(text: &str) -> Vec<u16> {
    let mut decoder = Utf8Decoder::new();
    text.bytes().filter_map(|b| decoder.push(b)).collect()
}

/// Glyph bitmap as rows of `#` and `.`, spacing columns drawn as blanks
pub fn glyph_art(glyph: &Glyph) -> Vec<String> {
    (0..glyph.height as u16)
        .map(|y| {
            let mut row: String = (0..glyph.width as u16)
                .map(|x| if glyph.bitmap.pixel(x, y) { '#' } else { '.' })
                .collect();
            row.extend(std::iter::repeat(' ').take(glyph.spacing as usize));
            row
        })
        .collect()
}

/// Glyphs of a string side by side
pub fn text_art(font: &FontTable, text: &str) -> Vec<String> {
    let glyphs: Vec<Vec<String>> = code_points(text)
        .into_iter()
        .map(|code| glyph_art(&font.glyph(code)))
        .collect();
    (0..font.height() as usize)
        .map(|y| {
            glyphs
                .iter()
                .map(|g| g.get(y).map(String::as_str).unwrap_or(""))
                .collect::<String>()
        })
        .collect()
}

pub fn print_font_report(font: &FontTable, text: &str) {
    println!("{}", "=".repeat(60));
    println!("{}", format!("Font Table ({})", font.format()).cyan().bold());
    println!("{}", "=".repeat(60));

    println!("\n{}", "Header:".white().bold());
    println!("  Glyph size: {}x{}", font.width(), font.height());
    println!("  Pages per glyph: {}", font.pages());
    println!("  Fallback code: 0x{:02x}", font.ascii_offset());

    println!("\n{}", "Glyphs:".white().bold());
    for code in code_points(text) {
        let glyph = font.glyph(code);
        let label = char::from_u32(code as u32).unwrap_or('?');
        println!(
            "  {} U+{:04X} width {} spacing {}",
            format!("'{}'", label).yellow(),
            code,
            glyph.width,
            glyph.spacing
        );
    }

    let (w, h) = font.text_size(text);
    println!("\n{} {}x{} px", "Text size:".white().bold(), w, h);
    for row in text_art(font, text) {
        println!("  {}", row);
    }
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_glyph_art() {
        let font = parse_font(&FONT_6X8, FontFormat::Fixed).unwrap();
        let art = glyph_art(&font.glyph('I' as u16));
        assert_eq!(art.len(), 8);
        assert_eq!(art[0], "..###.");
        assert_eq!(art[3], "...#..");
        assert_eq!(art[7], "......");
    }

    #[test]
    fn test_text_art_width() {
        let font = parse_font(&FONT_6X8, FontFormat::Fixed).unwrap();
        let rows = text_art(&font, "abc");
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.chars().count() == 18));
    }

    #[test]
    fn test_code_points_decode_utf8() {
        assert_eq!(code_points("Aé"), vec![0x41, 0xE9]);
    }

    #[test]
    fn test_load_font_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("font.bin");
        fs::write(&path, &FONT_6X8[..8]).unwrap();
        assert_eq!(load_font_bytes(&path).unwrap().len(), 8);
        assert_eq!(
            load_font_bytes(&PathBuf::from(BUILTIN_NAME)).unwrap(),
            FONT_6X8.to_vec()
        );
        assert!(load_font_bytes(&dir.path().join("missing.bin")).is_err());
    }

    #[test]
    fn test_wrong_format_tag() {
        let err = parse_font(&FONT_6X8, FontFormat::Free).unwrap_err();
        assert!(err.to_string().starts_with("free table"));
    }
}
