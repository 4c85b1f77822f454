//! Pixel engine and block-addressed drivers for small dot-matrix displays
//!
//! This crate renders points, lines, rectangles, bitmaps and text into packed
//! framebuffers of four pixel formats, and streams the same primitives straight
//! into the GDRAM of common OLED/TFT controllers over I2C or SPI.
//!
//! # Architecture
//!
//! ```text
//!          Application
//!               │
//!               ▼
//!        ┌─────────────┐
//!        │ DrawEngine  │  line / rect / blit / text, written once
//!        └──────┬──────┘
//!        ┌──────┴────────────────┐
//!        ▼                       ▼
//! ┌───────────────┐      ┌───────────────┐
//! │PixelSurface<F>│      │DirectDisplay<A>│
//! │ Mono1 Gray4   │      └───────┬───────┘
//! │ Rgb332 Rgb565 │──blt──┐      │
//! └───────────────┘       ▼      ▼
//!                  ┌─────────────────┐
//!                  │  DeviceAdapter  │  SSD1306, SH1106, PCD8544,
//!                  │   Block guard   │  SSD1325, SSD1331, SSD1351, ILI9341
//!                  └────────┬────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │ Interface (I2C/ │
//!                  │   SPI framing)  │
//!                  └─────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Every primitive clips against the sink before touching a byte
//! - Every wire session opened by `set_block` is closed when its guard drops
//! - No heap allocation outside the `std` test helpers

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod color;
pub mod device;
pub mod display;
pub mod engine;
pub mod font;
pub mod geometry;
pub mod hal;
pub mod menu;
pub mod surface;

// Re-export main types
pub use device::{
    AdapterInfo, Block, ColorDepth, ControllerKind, DeviceAdapter, DirectDisplay, LcdMode,
};
pub use display::Display;
pub use engine::{FontStyle, PixelSink, TextMode};
pub use font::{FontError, FontFormat, FontTable, Glyph, MonoBitmap};
pub use geometry::{Point, Rect};
pub use menu::Menu;
pub use hal::Interface;
pub use surface::{Gray4, Mono1, PixelFormat, PixelSurface, Rgb332, Rgb565, SurfaceError};
