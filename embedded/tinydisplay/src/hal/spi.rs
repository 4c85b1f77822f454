//! SPI framing
//!
//! Chip select brackets a session and the D/C pin tells the controller
//! whether the bytes that follow are commands (low) or data (high).

use super::{Interface, OutputPin};

/// SPI bus settings handed to the bus when the interface is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    pub frequency_hz: u32,
    /// SPI mode (0-3)
    pub mode: u8,
}

impl SpiConfig {
    /// 8 MHz, mode 0 (SSD13xx / SH1106 / PCD8544 class)
    pub const OLED: Self = Self {
        frequency_hz: 8_000_000,
        mode: 0,
    };

    /// 32 MHz, mode 0 (ILI9341)
    pub const TFT: Self = Self {
        frequency_hz: 32_000_000,
        mode: 0,
    };
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::OLED
    }
}

/// Byte-level SPI master with manual chip select
pub trait SpiBus {
    fn configure(&mut self, config: SpiConfig) {
        let _ = config;
    }

    /// Assert chip select
    fn select(&mut self);
    /// Release chip select
    fn deselect(&mut self);
    fn write(&mut self, byte: u8);

    fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write(b);
        }
    }
}

/// [`Interface`] over a SPI bus plus a D/C pin
pub struct SpiInterface<B: SpiBus, P: OutputPin> {
    bus: B,
    dc: P,
    config: SpiConfig,
}

impl<B: SpiBus, P: OutputPin> SpiInterface<B, P> {
    pub fn new(mut bus: B, dc: P, config: SpiConfig) -> Self {
        bus.configure(config);
        Self { bus, dc, config }
    }

    pub fn config(&self) -> SpiConfig {
        self.config
    }

    /// Gives back the bus and pin
    pub fn release(self) -> (B, P) {
        (self.bus, self.dc)
    }
}

impl<B: SpiBus, P: OutputPin> Interface for SpiInterface<B, P> {
    fn start(&mut self) {
        self.bus.select();
    }

    fn stop(&mut self) {
        self.bus.deselect();
    }

    fn send(&mut self, byte: u8) {
        self.bus.write(byte);
    }

    fn send_buffer(&mut self, bytes: &[u8]) {
        self.bus.write_all(bytes);
    }

    fn command_mode(&mut self) {
        self.dc.set_low();
    }

    fn data_mode(&mut self) {
        self.dc.set_high();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Line {
        Cs(bool),
        Dc(bool),
        Byte(u8),
    }

    type Log = Rc<RefCell<Vec<Line>>>;

    struct FakeBus(Log, Option<SpiConfig>);
    struct FakePin(Log);

    impl SpiBus for FakeBus {
        fn configure(&mut self, config: SpiConfig) {
            self.1 = Some(config);
        }
        fn select(&mut self) {
            self.0.borrow_mut().push(Line::Cs(true));
        }
        fn deselect(&mut self) {
            self.0.borrow_mut().push(Line::Cs(false));
        }
        fn write(&mut self, byte: u8) {
            self.0.borrow_mut().push(Line::Byte(byte));
        }
    }

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.0.borrow_mut().push(Line::Dc(true));
        }
        fn set_low(&mut self) {
            self.0.borrow_mut().push(Line::Dc(false));
        }
    }

    #[test]
    fn test_spi_framing() {
        let log: Log = Rc::default();
        let mut intf = SpiInterface::new(
            FakeBus(log.clone(), None),
            FakePin(log.clone()),
            SpiConfig::TFT,
        );
        intf.start();
        intf.command_mode();
        intf.send(0x2C);
        intf.data_mode();
        intf.send_buffer(&[0xF8, 0x00]);
        intf.stop();

        assert_eq!(
            *log.borrow(),
            vec![
                Line::Cs(true),
                Line::Dc(false),
                Line::Byte(0x2C),
                Line::Dc(true),
                Line::Byte(0xF8),
                Line::Byte(0x00),
                Line::Cs(false),
            ]
        );
        let (bus, _) = intf.release();
        assert_eq!(bus.1, Some(SpiConfig::TFT));
    }
}
