//! Buffered display
//!
//! Pairs a [`DeviceAdapter`] with a full-screen [`PixelSurface`]. Drawing goes
//! to the surface; [`Display::refresh`] pushes it to the controller when
//! anything changed since the last refresh.

use crate::device::DeviceAdapter;
use crate::surface::{PixelFormat, PixelSurface, SurfaceError};

/// High-level display: adapter plus framebuffer
pub struct Display<'a, F: PixelFormat, A: DeviceAdapter> {
    adapter: A,
    surface: PixelSurface<'a, F>,
    dirty: bool,
}

impl<'a, F: PixelFormat, A: DeviceAdapter> Display<'a, F, A> {
    /// Creates a display whose surface covers the whole panel. `buffer` must
    /// hold `F::buffer_len(width, height)` bytes.
    pub fn new(adapter: A, buffer: &'a mut [u8]) -> Result<Self, SurfaceError> {
        let info = adapter.info();
        let surface = PixelSurface::new(info.width, info.height, buffer)?;
        Ok(Self {
            adapter,
            surface,
            dirty: true,
        })
    }

    /// Runs the controller init sequence
    pub fn init(&mut self) {
        self.adapter.init();
        self.dirty = true;
    }

    pub fn surface(&self) -> &PixelSurface<'a, F> {
        &self.surface
    }

    /// Get mutable access to the surface; marks the display dirty
    pub fn surface_mut(&mut self) -> &mut PixelSurface<'a, F> {
        self.dirty = true;
        &mut self.surface
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sends the surface to the controller if it changed. Returns whether
    /// anything was sent.
    pub fn refresh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.surface.blt_at(&mut self.adapter, 0, 0);
        self.dirty = false;
        true
    }

    /// Zero-fills the surface
    pub fn clear(&mut self) {
        self.surface.clear();
        self.dirty = true;
    }

    pub fn release(self) -> A {
        self.adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{LcdMode, Ssd1306, Ssd1306Variant, Ssd1331};
    use crate::hal::mock::RecordingInterface;
    use crate::surface::{Mono1, Rgb332};

    #[test]
    fn test_refresh_only_when_dirty() {
        let mut buf = [0u8; 512];
        let adapter = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H32);
        let mut display = Display::<Mono1, _>::new(adapter, &mut buf).unwrap();
        assert!(display.refresh());
        assert!(!display.refresh());
        display.surface_mut().put_pixel(0, 0);
        assert!(display.is_dirty());
        assert!(display.refresh());
        let intf = display.release().release();
        assert!(intf.is_balanced());
        assert_eq!(intf.data().len(), 2 * 512);
        assert_eq!(intf.data()[512], 0x01);
    }

    #[test]
    fn test_buffer_checked_against_panel() {
        let mut buf = [0u8; 100];
        let adapter = Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64);
        assert!(matches!(
            Display::<Mono1, _>::new(adapter, &mut buf),
            Err(SurfaceError::BufferTooSmall { needed: 1024, .. })
        ));
    }

    #[test]
    fn test_color_refresh_switches_mode() {
        let mut buf = [0u8; 96 * 64];
        let adapter = Ssd1331::new(RecordingInterface::new());
        let mut display = Display::<Rgb332, _>::new(adapter, &mut buf).unwrap();
        display.surface_mut().set_color(0xE0);
        display.surface_mut().fill_rect(0, 0, 95, 63);
        display.refresh();
        let mut adapter = display.release();
        assert_eq!(adapter.mode(), LcdMode::Normal);
        let intf = adapter.interface();
        assert_eq!(intf.data().len(), 96 * 64);
        assert!(intf.data().iter().all(|&b| b == 0xE0));
    }
}
