//! Serial port displays.
//!
//! The VFD controllers sit on plain RS-232 lines: 8 data bits, no parity,
//! one stop bit, 9600 baud unless configured otherwise.
//!
//! # Example
//!
//! ```ignore
//! use vfd_weather::hal::SerialOpener;
//! use vfd_weather::traits::{Transport, TransportOpener};
//!
//! let mut opener = SerialOpener::new(9600);
//! let mut port = opener.open("/dev/ttyS5")?;
//! port.write_all(&[0x1B, 0x05])?;
//! ```

use crate::traits::{Transport, TransportOpener};
use core::time::Duration;
use serialport::{DataBits, Parity, SerialPort, StopBits};
use std::io::Write;
use tracing::info;

/// Write timeout for a single frame or text run.
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Opens serial ports at a fixed baud rate.
#[derive(Clone, Copy, Debug)]
pub struct SerialOpener {
    baud_rate: u32,
}

impl SerialOpener {
    /// Creates an opener for `baud_rate`.
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl TransportOpener for SerialOpener {
    type Transport = SerialTransport;
    type Error = serialport::Error;

    fn open(&mut self, endpoint: &str) -> Result<SerialTransport, serialport::Error> {
        let port = serialport::new(endpoint, self.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(WRITE_TIMEOUT)
            .open()?;
        info!(endpoint, baud = self.baud_rate, "serial port opened");
        Ok(SerialTransport { port })
    }
}

/// An open serial port. Closed on drop.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Name the OS reports for the port, if any.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialTransport {
    type Error = std::io::Error;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), std::io::Error> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}

impl core::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_keeps_baud() {
        assert_eq!(SerialOpener::new(9600).baud_rate(), 9600);
    }

    #[test]
    fn missing_device_is_an_error() {
        let mut opener = SerialOpener::new(9600);
        assert!(opener.open("/dev/does-not-exist-vfd").is_err());
    }
}
