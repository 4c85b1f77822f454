//! Controller profile definitions
//!
//! A profile describes one supported panel: geometry, native depth, the buses
//! it is wired over and the command table it is brought up with.

use clap::ValueEnum;
use std::fmt;
use tinydisplay::device::{ColorDepth, ControllerKind, LcdMode, Ssd1306Variant};
use tinydisplay::hal::SpiConfig;

/// Physical bus a controller can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Bus {
    Spi,
    I2c,
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bus::Spi => write!(f, "SPI"),
            Bus::I2c => write!(f, "I2C"),
        }
    }
}

/// Concrete driver configuration behind a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Ssd1306(Ssd1306Variant),
    Sh1106,
    Pcd8544,
    Ssd1325,
    Ssd1331,
    Ssd1351,
    Ili9341,
}

impl Model {
    pub fn kind(&self) -> ControllerKind {
        match self {
            Model::Ssd1306(_) => ControllerKind::Ssd1306,
            Model::Sh1106 => ControllerKind::Sh1106,
            Model::Pcd8544 => ControllerKind::Pcd8544,
            Model::Ssd1325 => ControllerKind::Ssd1325,
            Model::Ssd1331 => ControllerKind::Ssd1331,
            Model::Ssd1351 => ControllerKind::Ssd1351,
            Model::Ili9341 => ControllerKind::Ili9341,
        }
    }
}

/// Complete controller profile
#[derive(Debug, Clone)]
pub struct ControllerProfile {
    /// Short identifier (e.g., "ssd1306")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub description: &'static str,
    pub model: Model,
    pub width: u16,
    pub height: u16,
    pub depth: ColorDepth,
    /// Buses the driver supports, preferred first
    pub buses: &'static [Bus],
    /// Addressing modes the controller can be switched into
    pub modes: &'static [LcdMode],
    /// One-line summary of the GDRAM window commands
    pub addressing: &'static str,
    /// Power-up command table as stored in flash
    pub init_table: &'static [u8],
    /// Whether the init table carries command arguments in data mode
    pub init_has_args: bool,
    pub spi: SpiConfig,
}

impl ControllerProfile {
    pub fn kind(&self) -> ControllerKind {
        self.model.kind()
    }

    /// Framebuffer size of a full-screen surface in the native depth
    pub fn framebuffer_bytes(&self) -> usize {
        let pixels = self.width as usize * self.height as usize;
        pixels * self.depth.bits() as usize / 8
    }

    pub fn supports(&self, bus: Bus) -> bool {
        self.buses.contains(&bus)
    }

    pub fn supports_mode(&self, mode: LcdMode) -> bool {
        self.modes.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind() {
        assert_eq!(
            Model::Ssd1306(Ssd1306Variant::W128H32).kind(),
            ControllerKind::Ssd1306
        );
        assert_eq!(Model::Ili9341.kind(), ControllerKind::Ili9341);
    }

    #[test]
    fn test_bus_display() {
        assert_eq!(Bus::Spi.to_string(), "SPI");
        assert_eq!(Bus::I2c.to_string(), "I2C");
    }
}
