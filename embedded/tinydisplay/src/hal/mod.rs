//! Wire framing between the controller drivers and the bus
//!
//! Drivers speak [`Interface`]: open a session, pick command or data mode,
//! push bytes, close the session. The framing layers map that onto:
//! - SPI with a D/C select pin ([`spi::SpiInterface`])
//! - I2C with control-byte prefixes ([`i2c::I2cInterface`])
//! - an in-memory recorder for tests and host tools ([`mock::RecordingInterface`])

pub mod gpio;
pub mod i2c;
#[cfg(any(test, feature = "std"))]
pub mod mock;
pub mod spi;

pub use gpio::OutputPin;
pub use i2c::{I2cBus, I2cConfig, I2cInterface};
pub use spi::{SpiBus, SpiConfig, SpiInterface};

/// Byte channel to a display controller.
///
/// Every `start()` must be matched by exactly one `stop()`. Transport errors
/// are the bus implementation's business; framing never fails.
pub trait Interface {
    /// Opens a transaction
    fn start(&mut self);
    /// Closes the transaction opened by `start`
    fn stop(&mut self);
    fn send(&mut self, byte: u8);

    fn send_buffer(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.send(b);
        }
    }

    /// Following bytes are commands
    fn command_mode(&mut self);
    /// Following bytes are GDRAM data or command arguments
    fn data_mode(&mut self);
}

impl<T: Interface + ?Sized> Interface for &mut T {
    fn start(&mut self) {
        (**self).start();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn send(&mut self, byte: u8) {
        (**self).send(byte);
    }

    fn send_buffer(&mut self, bytes: &[u8]) {
        (**self).send_buffer(bytes);
    }

    fn command_mode(&mut self) {
        (**self).command_mode();
    }

    fn data_mode(&mut self) {
        (**self).data_mode();
    }
}
