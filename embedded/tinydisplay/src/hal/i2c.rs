//! I2C framing
//!
//! There is no D/C line on I2C. Each write transaction starts with a control
//! byte: 0x00 for a command stream, 0x40 for a data stream. Switching
//! streams inside a session restarts the bus transaction.

use super::Interface;

/// Control byte announcing commands
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte announcing GDRAM data
pub const CONTROL_DATA: u8 = 0x40;

/// I2C bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    /// 7-bit slave address
    pub address: u8,
    pub frequency_hz: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            address: 0x3C,
            frequency_hz: 400_000,
        }
    }
}

/// Byte-level I2C master
pub trait I2cBus {
    /// START condition plus address byte for a write
    fn begin(&mut self, address: u8);
    /// STOP condition
    fn end(&mut self);
    fn write(&mut self, byte: u8);
}

/// [`Interface`] over an I2C bus
pub struct I2cInterface<B: I2cBus> {
    bus: B,
    config: I2cConfig,
    /// A control byte went out in the current bus transaction
    framed: bool,
}

impl<B: I2cBus> I2cInterface<B> {
    pub fn new(bus: B, config: I2cConfig) -> Self {
        Self {
            bus,
            config,
            framed: false,
        }
    }

    pub fn config(&self) -> I2cConfig {
        self.config
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn control(&mut self, byte: u8) {
        if self.framed {
            self.bus.end();
            self.bus.begin(self.config.address);
        }
        self.bus.write(byte);
        self.framed = true;
    }
}

impl<B: I2cBus> Interface for I2cInterface<B> {
    fn start(&mut self) {
        self.bus.begin(self.config.address);
        self.framed = false;
    }

    fn stop(&mut self) {
        self.bus.end();
        self.framed = false;
    }

    fn send(&mut self, byte: u8) {
        self.bus.write(byte);
    }

    fn command_mode(&mut self) {
        self.control(CONTROL_COMMAND);
    }

    fn data_mode(&mut self) {
        self.control(CONTROL_DATA);
    }
}
