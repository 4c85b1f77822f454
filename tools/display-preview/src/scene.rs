//! Scene files
//!
//! A scene is a TOML description of a surface and a list of draw operations:
//!
//! ```toml
//! [surface]
//! width = 128
//! height = 64
//! format = "mono1"
//!
//! [font]
//! builtin = "6x8"
//!
//! [[op]]
//! kind = "rect"
//! x1 = 0
//! y1 = 0
//! x2 = 127
//! y2 = 63
//!
//! [[op]]
//! kind = "text"
//! x = 4
//! y = 4
//! text = "hello"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tinydisplay::engine::{self, FontStyle, PixelSink, TextMode};
use tinydisplay::font::{FontFormat, FontTable, MonoBitmap, FONT_6X8};
use tinydisplay::menu::Menu;

/// Scene loading errors
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unsupported surface size {width}x{height}")]
    InvalidSize { width: u16, height: u16 },

    #[error("unknown builtin font '{0}' (available: 6x8)")]
    UnknownBuiltin(String),

    #[error("font section needs either 'builtin' or 'path'")]
    MissingFontSource,

    #[error("font table rejected: {0}")]
    Font(String),

    #[error("bitmap op needs {needed} bytes of data, got {actual}")]
    BitmapData { needed: usize, actual: usize },
}

/// Pixel format of the rendered surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceFormat {
    Mono1,
    Gray4,
    Rgb332,
    Rgb565,
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceFormat::Mono1 => write!(f, "mono1"),
            SurfaceFormat::Gray4 => write!(f, "gray4"),
            SurfaceFormat::Rgb332 => write!(f, "rgb332"),
            SurfaceFormat::Rgb565 => write!(f, "rgb565"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceSpec {
    pub width: u16,
    pub height: u16,
    #[serde(default = "default_format")]
    pub format: SurfaceFormat,
}

fn default_format() -> SurfaceFormat {
    SurfaceFormat::Mono1
}

/// Font table format names accepted in scene files and on the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FontKind {
    Fixed,
    Free,
    Squix,
}

impl From<FontKind> for FontFormat {
    fn from(kind: FontKind) -> Self {
        match kind {
            FontKind::Fixed => FontFormat::Fixed,
            FontKind::Free => FontFormat::Free,
            FontKind::Squix => FontFormat::Squix,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FontSpec {
    /// Name of a font compiled into the library
    pub builtin: Option<String>,
    /// Font table file, relative to the scene file
    pub path: Option<PathBuf>,
    #[serde(default = "default_font_kind")]
    pub format: FontKind,
}

fn default_font_kind() -> FontKind {
    FontKind::Fixed
}

/// One draw operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Op {
    Color { value: u16 },
    Pixel { x: i32, y: i32 },
    Hline { x1: i32, y: i32, x2: i32 },
    Vline { x: i32, y1: i32, y2: i32 },
    Line { x1: i32, y1: i32, x2: i32, y2: i32 },
    Rect { x1: i32, y1: i32, x2: i32, y2: i32 },
    Fill { x1: i32, y1: i32, x2: i32, y2: i32 },
    Clear { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// Page-ordered 1bpp sprite
    Bitmap { x: i32, y: i32, width: u16, height: u16, data: Vec<u8> },
    /// XBM image, rows LSB first
    Xbitmap { x: i32, y: i32, width: u16, height: u16, data: Vec<u8> },
    Text {
        x: i32,
        y: i32,
        text: String,
        #[serde(default)]
        bold: bool,
        /// Glyph pixels become `2^scale` squares
        #[serde(default)]
        scale: u8,
    },
    TextMode {
        #[serde(default)]
        transparent: bool,
        #[serde(default)]
        wrap: bool,
        #[serde(default)]
        wrap_local: bool,
        #[serde(default)]
        inverse: bool,
    },
    /// Framed list menu; covers the surface unless an area is given
    Menu {
        items: Vec<String>,
        #[serde(default)]
        selection: usize,
        #[serde(default)]
        area: Option<[i32; 4]>,
    },
}

/// Parsed scene, with its font bytes loaded
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub surface: SurfaceSpec,
    pub font: Option<FontSpec>,
    #[serde(default, rename = "op")]
    pub ops: Vec<Op>,
    /// Loaded font table bytes
    #[serde(skip)]
    pub font_data: Option<Vec<u8>>,
}

impl Scene {
    /// Parses a scene from TOML text. Font files are resolved against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let mut scene: Scene = toml::from_str(text).map_err(SceneError::from)?;
        scene.validate()?;
        if let Some(spec) = &scene.font {
            scene.font_data = Some(load_font_bytes(spec, base)?);
        }
        Ok(scene)
    }

    /// Loads and parses a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base).with_context(|| format!("In scene {}", path.display()))
    }

    fn validate(&self) -> Result<(), SceneError> {
        let SurfaceSpec { width, height, format } = self.surface;
        let aligned = format != SurfaceFormat::Mono1 || height % 8 == 0;
        if width == 0 || height == 0 || !aligned {
            return Err(SceneError::InvalidSize { width, height });
        }
        for op in &self.ops {
            if let Op::Bitmap { width, height, data, .. } = op {
                let needed = *width as usize * ((*height as usize + 7) / 8);
                if data.len() < needed {
                    return Err(SceneError::BitmapData { needed, actual: data.len() });
                }
            }
            if let Op::Xbitmap { width, height, data, .. } = op {
                let needed = ((*width as usize + 7) / 8) * *height as usize;
                if data.len() < needed {
                    return Err(SceneError::BitmapData { needed, actual: data.len() });
                }
            }
        }
        Ok(())
    }

    /// Font table view over the loaded bytes
    pub fn font_table(&self) -> Result<Option<FontTable<'_>>, SceneError> {
        let (Some(spec), Some(data)) = (&self.font, &self.font_data) else {
            return Ok(None);
        };
        FontTable::new(data, spec.format.into())
            .map(Some)
            .map_err(|e| SceneError::Font(e.to_string()))
    }

    /// Runs every operation against `sink`
    pub fn draw<S: PixelSink>(&self, sink: &mut S) -> Result<(), SceneError> {
        let font = self.font_table()?;
        for op in &self.ops {
            apply(sink, font.as_ref(), op);
        }
        Ok(())
    }
}

fn load_font_bytes(spec: &FontSpec, base: &Path) -> Result<Vec<u8>> {
    match (&spec.builtin, &spec.path) {
        (Some(name), _) => match name.as_str() {
            "6x8" => Ok(FONT_6X8.to_vec()),
            other => Err(SceneError::UnknownBuiltin(other.to_string()).into()),
        },
        (None, Some(path)) => {
            let full = base.join(path);
            fs::read(&full).with_context(|| format!("Failed to read font: {}", full.display()))
        }
        (None, None) => Err(SceneError::MissingFontSource.into()),
    }
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, u16::MAX as i32) as u16
}

/// Applies one operation; text without a font is skipped
pub fn apply<S: PixelSink>(sink: &mut S, font: Option<&FontTable>, op: &Op) {
    match op {
        Op::Color { value } => sink.set_color(*value),
        Op::Pixel { x, y } => engine::put_pixel(sink, *x, *y),
        Op::Hline { x1, y, x2 } => engine::draw_hline(sink, *x1, *y, *x2),
        Op::Vline { x, y1, y2 } => engine::draw_vline(sink, *x, *y1, *y2),
        Op::Line { x1, y1, x2, y2 } => engine::draw_line(sink, *x1, *y1, *x2, *y2),
        Op::Rect { x1, y1, x2, y2 } => engine::draw_rect(sink, *x1, *y1, *x2, *y2),
        Op::Fill { x1, y1, x2, y2 } => engine::fill_rect(sink, *x1, *y1, *x2, *y2),
        Op::Clear { x1, y1, x2, y2 } => engine::clear_rect(sink, *x1, *y1, *x2, *y2),
        Op::Bitmap { x, y, width, height, data } => {
            engine::draw_bitmap1(sink, *x, *y, &MonoBitmap::new(*width, *height, data));
        }
        Op::Xbitmap { x, y, width, height, data } => {
            engine::draw_xbitmap1(sink, *x, *y, *width, *height, data);
        }
        Op::Text { x, y, text, bold, scale } => match font {
            Some(font) => {
                let style = if *bold { FontStyle::Bold } else { FontStyle::Normal };
                if *scale > 0 {
                    engine::print_fixed_n(sink, font, *x, *y, text, style, *scale);
                } else {
                    engine::print_fixed(sink, font, *x, *y, text, style);
                }
            }
            None => log::warn!("text '{}' skipped: scene has no font", text),
        },
        Op::TextMode { transparent, wrap, wrap_local, inverse } => {
            let mut mode = TextMode::empty();
            mode.set(TextMode::TRANSPARENT, *transparent);
            mode.set(TextMode::WRAP, *wrap);
            mode.set(TextMode::WRAP_LOCAL, *wrap_local);
            mode.set(TextMode::INVERSE, *inverse);
            sink.text_state_mut().mode = mode;
        }
        Op::Menu { items, selection, area } => match font {
            Some(font) => {
                let labels: Vec<&str> = items.iter().map(String::as_str).collect();
                let mut menu = Menu::new(&labels);
                if let Some([left, top, width, height]) = area {
                    let (width, height) = (clamp_u16(*width), clamp_u16(*height));
                    menu = menu.with_area(*left, *top, width, height);
                }
                for _ in 0..(*selection).min(labels.len().saturating_sub(1)) {
                    menu.down();
                }
                menu.show(sink, font);
            }
            None => log::warn!("menu of {} items skipped: scene has no font", items.len()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SCENE: &str = r#"
[surface]
width = 64
height = 32

[font]
builtin = "6x8"

[[op]]
kind = "rect"
x1 = 0
y1 = 0
x2 = 63
y2 = 31

[[op]]
kind = "text"
x = 2
y = 2
text = "Hi"
bold = true

[[op]]
kind = "text_mode"
transparent = true
"#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::parse(SCENE, Path::new(".")).unwrap();
        assert_eq!(scene.surface.format, SurfaceFormat::Mono1);
        assert_eq!(scene.ops.len(), 3);
        assert_eq!(
            scene.ops[0],
            Op::Rect { x1: 0, y1: 0, x2: 63, y2: 31 }
        );
        assert!(matches!(scene.ops[1], Op::Text { bold: true, .. }));
        assert!(scene.font_table().unwrap().is_some());
    }

    #[test]
    fn test_parse_scaled_text_and_menu() {
        let text = r#"
[surface]
width = 64
height = 32

[[op]]
kind = "text"
x = 0
y = 0
text = "Big"
scale = 2

[[op]]
kind = "text_mode"
inverse = true

[[op]]
kind = "menu"
items = ["One", "Two"]
"#;
        let scene = Scene::parse(text, Path::new(".")).unwrap();
        assert!(matches!(scene.ops[0], Op::Text { scale: 2, bold: false, .. }));
        assert!(matches!(scene.ops[1], Op::TextMode { inverse: true, transparent: false, .. }));
        assert_eq!(
            scene.ops[2],
            Op::Menu { items: vec!["One".into(), "Two".into()], selection: 0, area: None }
        );
    }

    #[test]
    fn test_rejects_unaligned_mono() {
        let text = "[surface]\nwidth = 10\nheight = 12\nformat = \"mono1\"\n";
        let err = Scene::parse(text, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("10x12"));
        let text = "[surface]\nwidth = 10\nheight = 12\nformat = \"rgb565\"\n";
        assert!(Scene::parse(text, Path::new(".")).is_ok());
    }

    #[test]
    fn test_short_bitmap_data() {
        let text = r#"
[surface]
width = 16
height = 16

[[op]]
kind = "bitmap"
x = 0
y = 0
width = 4
height = 16
data = [1, 2, 3]
"#;
        let err = Scene::parse(text, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("needs 8 bytes"));
    }

    #[test]
    fn test_font_path_relative_to_scene() {
        let dir = tempdir().unwrap();
        let mut font = fs::File::create(dir.path().join("tiny.font")).unwrap();
        font.write_all(&FONT_6X8).unwrap();
        let scene_path = dir.path().join("scene.toml");
        fs::write(
            &scene_path,
            "[surface]\nwidth = 8\nheight = 8\n\n[font]\npath = \"tiny.font\"\nformat = \"fixed\"\n",
        )
        .unwrap();
        let scene = Scene::load(&scene_path).unwrap();
        assert_eq!(scene.font_data.as_deref(), Some(&FONT_6X8[..]));
    }

    #[test]
    fn test_missing_font_file() {
        let dir = tempdir().unwrap();
        let scene_path = dir.path().join("scene.toml");
        fs::write(
            &scene_path,
            "[surface]\nwidth = 8\nheight = 8\n\n[font]\npath = \"absent.font\"\n",
        )
        .unwrap();
        let err = Scene::load(&scene_path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read font"));
    }
}
