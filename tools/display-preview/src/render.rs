//! Offline rendering of scenes into framebuffers
//!
//! The scene runs against a real `PixelSurface`, so what comes out here is
//! byte for byte what a device would receive from `blt`.

use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder};
use chrono::Local;
use crc::{Crc, CRC_32_ISO_HDLC};
use std::fs;
use std::path::Path;
use tinydisplay::color::Color;
use tinydisplay::surface::{Gray4, Mono1, PixelFormat, PixelSurface, Rgb332, Rgb565};

use crate::scene::{Scene, SurfaceFormat};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Rendered framebuffer plus the format it is packed in
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub width: u16,
    pub height: u16,
    pub format: SurfaceFormat,
    /// Packed surface bytes, exactly as a device would receive them
    pub buffer: Vec<u8>,
}

/// Renders `scene` into a fresh zeroed surface
pub fn render(scene: &Scene) -> Result<Framebuffer> {
    let spec = &scene.surface;
    match spec.format {
        SurfaceFormat::Mono1 => render_as::<Mono1>(scene),
        SurfaceFormat::Gray4 => render_as::<Gray4>(scene),
        SurfaceFormat::Rgb332 => render_as::<Rgb332>(scene),
        SurfaceFormat::Rgb565 => render_as::<Rgb565>(scene),
    }
}

fn render_as<F: PixelFormat>(scene: &Scene) -> Result<Framebuffer> {
    let spec = &scene.surface;
    let mut buffer = vec![0u8; F::buffer_len(spec.width, spec.height)];
    {
        let mut surface = PixelSurface::<F>::new(spec.width, spec.height, &mut buffer)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        scene.draw(&mut surface)?;
    }
    log::debug!(
        "rendered {}x{} {} ({} bytes)",
        spec.width,
        spec.height,
        F::NAME,
        buffer.len()
    );
    Ok(Framebuffer {
        width: spec.width,
        height: spec.height,
        format: spec.format,
        buffer,
    })
}

impl Framebuffer {
    /// Stored value of one pixel
    pub fn pixel(&self, x: u16, y: u16) -> u16 {
        let w = self.width as usize;
        let (x, y) = (x as usize, y as usize);
        match self.format {
            SurfaceFormat::Mono1 => {
                let byte = self.buffer[(y >> 3) * w + x];
                ((byte >> (y & 7)) & 1) as u16
            }
            SurfaceFormat::Gray4 => {
                let byte = self.buffer[y * ((w + 1) >> 1) + (x >> 1)];
                if x & 1 == 0 {
                    (byte & 0x0F) as u16
                } else {
                    (byte >> 4) as u16
                }
            }
            SurfaceFormat::Rgb332 => self.buffer[y * w + x] as u16,
            SurfaceFormat::Rgb565 => BigEndian::read_u16(&self.buffer[2 * (y * w + x)..]),
        }
    }

    pub fn checksum(&self) -> u32 {
        CRC32.checksum(&self.buffer)
    }

    /// Number of non-zero pixels
    pub fn lit_pixels(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y) != 0)
            .count()
    }

    /// One line per pixel row: `#` for lit pixels, `.` for dark ones
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.pixel(x, y) != 0 { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }

    /// Netpbm image: P4 for 1bpp (lit pixels black), P5 for gray, P6 for
    /// color
    pub fn to_netpbm(&self) -> Vec<u8> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let (magic, maxval) = match self.format {
            SurfaceFormat::Mono1 => ("P4", None),
            SurfaceFormat::Gray4 => ("P5", Some(15)),
            SurfaceFormat::Rgb332 | SurfaceFormat::Rgb565 => ("P6", Some(255)),
        };
        let mut out = format!(
            "{}\n# display-preview {} {}\n{} {}\n",
            magic, self.format, stamp, self.width, self.height
        )
        .into_bytes();
        if let Some(maxval) = maxval {
            out.extend_from_slice(format!("{}\n", maxval).as_bytes());
        }

        for y in 0..self.height {
            match self.format {
                SurfaceFormat::Mono1 => {
                    let mut row = vec![0u8; (self.width as usize + 7) / 8];
                    for x in 0..self.width {
                        if self.pixel(x, y) != 0 {
                            row[x as usize / 8] |= 0x80 >> (x % 8);
                        }
                    }
                    out.extend_from_slice(&row);
                }
                SurfaceFormat::Gray4 => {
                    out.extend((0..self.width).map(|x| self.pixel(x, y) as u8));
                }
                SurfaceFormat::Rgb332 | SurfaceFormat::Rgb565 => {
                    for x in 0..self.width {
                        let value = self.pixel(x, y);
                        let color = match self.format {
                            SurfaceFormat::Rgb332 => Color::from_rgb332(value as u8),
                            _ => Color::from_rgb565(value),
                        };
                        out.extend_from_slice(&[color.r, color.g, color.b]);
                    }
                }
            }
        }
        out
    }

    pub fn write_netpbm(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_netpbm())
            .with_context(|| format!("Failed to write image: {}", path.display()))
    }
}

/// Default image extension for a format
pub fn netpbm_extension(format: SurfaceFormat) -> &'static str {
    match format {
        SurfaceFormat::Mono1 => "pbm",
        SurfaceFormat::Gray4 => "pgm",
        SurfaceFormat::Rgb332 | SurfaceFormat::Rgb565 => "ppm",
    }
}
