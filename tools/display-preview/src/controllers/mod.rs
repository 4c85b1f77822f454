//! Controller profiles
//!
//! Built-in profiles for every controller tinydisplay drives, looked up by
//! id or alias.

pub mod profile;

pub use profile::{Bus, ControllerProfile, Model};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tinydisplay::device::{
    ColorDepth, Ili9341, LcdMode, Pcd8544, Sh1106, Ssd1306Variant, Ssd1325, Ssd1331, Ssd1351,
};
use tinydisplay::hal::mock::RecordingInterface;
use tinydisplay::hal::SpiConfig;

const MONO_MODES: &[LcdMode] = &[LcdMode::Compatible];
const COLOR_MODES: &[LcdMode] = &[LcdMode::Compatible, LcdMode::Normal];

/// Built-in profiles, in listing order
pub static PROFILES: Lazy<Vec<ControllerProfile>> = Lazy::new(|| {
    vec![
        ControllerProfile {
            id: "ssd1306",
            name: "SSD1306 128x64",
            description: "Monochrome OLED, horizontal addressing",
            model: Model::Ssd1306(Ssd1306Variant::W128H64),
            width: 128,
            height: 64,
            depth: ColorDepth::Mono1,
            buses: &[Bus::I2c, Bus::Spi],
            modes: MONO_MODES,
            addressing: "COLUMNADDR 0x21 / PAGEADDR 0x22, auto-advancing pages",
            init_table: Ssd1306Variant::W128H64.init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "ssd1306-128x32",
            name: "SSD1306 128x32",
            description: "Monochrome OLED, half-height panel",
            model: Model::Ssd1306(Ssd1306Variant::W128H32),
            width: 128,
            height: 32,
            depth: ColorDepth::Mono1,
            buses: &[Bus::I2c, Bus::Spi],
            modes: MONO_MODES,
            addressing: "COLUMNADDR 0x21 / PAGEADDR 0x22, auto-advancing pages",
            init_table: Ssd1306Variant::W128H32.init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "sh1106",
            name: "SH1106 128x64",
            description: "Monochrome OLED with a 132-column GDRAM",
            model: Model::Sh1106,
            width: 128,
            height: 64,
            depth: ColorDepth::Mono1,
            buses: &[Bus::I2c, Bus::Spi],
            modes: MONO_MODES,
            addressing: "page 0xB0|p, column nibbles 0x10/0x00 with +2 offset, reopened per page",
            init_table: Sh1106::<RecordingInterface>::init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "pcd8544",
            name: "PCD8544 84x48",
            description: "Nokia 5110 monochrome LCD",
            model: Model::Pcd8544,
            width: 84,
            height: 48,
            depth: ColorDepth::Mono1,
            buses: &[Bus::Spi],
            modes: MONO_MODES,
            addressing: "function set 0x20 (0x22 vertical), X 0x80|x, Y 0x40|p",
            init_table: Pcd8544::<RecordingInterface>::init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "ssd1325",
            name: "SSD1325 128x64",
            description: "16-level grayscale OLED",
            model: Model::Ssd1325,
            width: 128,
            height: 64,
            depth: ColorDepth::Gray4,
            buses: &[Bus::Spi, Bus::I2c],
            modes: COLOR_MODES,
            addressing: "column pairs 0x15 / rows 0x75, remap 0xA0 vertical bit 0x04",
            init_table: Ssd1325::<RecordingInterface>::init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "ssd1331",
            name: "SSD1331 96x64",
            description: "RGB OLED, 8-bit color",
            model: Model::Ssd1331,
            width: 96,
            height: 64,
            depth: ColorDepth::Rgb332,
            buses: &[Bus::Spi],
            modes: COLOR_MODES,
            addressing: "columns 0x15 / rows 0x75, remap 0xA0 vertical bit 0x01",
            init_table: Ssd1331::<RecordingInterface>::init_table(),
            init_has_args: false,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "ssd1351",
            name: "SSD1351 128x128",
            description: "RGB OLED, 16-bit color",
            model: Model::Ssd1351,
            width: 128,
            height: 128,
            depth: ColorDepth::Rgb565,
            buses: &[Bus::Spi],
            modes: COLOR_MODES,
            addressing: "columns 0x15 / rows 0x75 / write RAM 0x5C, arguments in data mode",
            init_table: Ssd1351::<RecordingInterface>::init_table(),
            init_has_args: true,
            spi: SpiConfig::OLED,
        },
        ControllerProfile {
            id: "ili9341",
            name: "ILI9341 240x320",
            description: "RGB565 TFT with MADCTL rotation",
            model: Model::Ili9341,
            width: 240,
            height: 320,
            depth: ColorDepth::Rgb565,
            buses: &[Bus::Spi],
            modes: COLOR_MODES,
            addressing: "CASET 0x2A / PASET 0x2B / RAMWR 0x2C, axes exchanged in compatible mode",
            init_table: Ili9341::<RecordingInterface>::init_table(),
            init_has_args: true,
            spi: SpiConfig::TFT,
        },
    ]
});

/// Registry of profile ids and aliases
pub static CONTROLLER_PROFILES: Lazy<HashMap<&'static str, &'static ControllerProfile>> =
    Lazy::new(|| {
        let mut m = HashMap::new();
        for profile in PROFILES.iter() {
            m.insert(profile.id, profile);
        }
        let aliases = [
            ("ssd1306-128x64", "ssd1306"),
            ("nokia5110", "pcd8544"),
            ("ili9341-240x320", "ili9341"),
        ];
        for (alias, id) in aliases {
            if let Some(profile) = m.get(id).copied() {
                m.insert(alias, profile);
            }
        }
        m
    });

/// Get a controller profile by id or alias
pub fn get_profile(name: &str) -> Option<&'static ControllerProfile> {
    CONTROLLER_PROFILES
        .get(name.to_lowercase().as_str())
        .copied()
}

/// Profile ids in listing order
pub fn profile_ids() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinydisplay::device::ControllerKind;

    #[test]
    fn test_every_kind_has_profile() {
        for kind in ControllerKind::ALL {
            assert!(PROFILES.iter().any(|p| p.kind() == kind), "{}", kind);
        }
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(get_profile("nokia5110").map(|p| p.id), Some("pcd8544"));
        assert_eq!(get_profile("SSD1306").map(|p| p.id), Some("ssd1306"));
        assert!(get_profile("st7735").is_none());
    }

    #[test]
    fn test_framebuffer_sizes() {
        assert_eq!(get_profile("ssd1306").map(|p| p.framebuffer_bytes()), Some(1024));
        assert_eq!(get_profile("ssd1325").map(|p| p.framebuffer_bytes()), Some(4096));
        assert_eq!(get_profile("ili9341").map(|p| p.framebuffer_bytes()), Some(153_600));
    }

    #[test]
    fn test_profile_dimensions_match_drivers() {
        use crate::trace::adapter_info;
        for profile in PROFILES.iter() {
            let info = adapter_info(profile.model);
            assert_eq!((info.width, info.height), (profile.width, profile.height));
            assert_eq!(info.depth, profile.depth);
        }
    }
}
