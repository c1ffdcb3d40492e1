//! Hardware abstraction traits: display transports, time and delays.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Transport`] | Exclusive byte sink for one display |
//! | [`TransportOpener`] | Creates transports from endpoint identifiers |
//! | [`WallClock`] | Local wall-clock time |
//! | [`Delay`] | Blocking sleep |
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::hal::MockOpener;
//! use vfd_weather::traits::{Transport, TransportOpener};
//!
//! let mut opener = MockOpener::new();
//! let mut port = opener.open("/dev/ttyS5").unwrap();
//! port.write_all(&[0x1B, 0x05]).unwrap();
//!
//! assert_eq!(opener.written("/dev/ttyS5"), vec![0x1B, 0x05]);
//! ```

use chrono::NaiveDateTime;
use core::fmt::Display;
use core::time::Duration;

/// A byte stream to one display.
///
/// Writes are blocking and must reach the device in the order issued.
/// Dropping the transport closes it.
pub trait Transport {
    /// Error type for write failures.
    type Error: Display;

    /// Writes the whole buffer.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Opens transports by endpoint identifier (e.g. a serial device path).
///
/// # Example Implementation
///
/// ```rust,ignore
/// use vfd_weather::traits::{Transport, TransportOpener};
///
/// struct TcpOpener;
///
/// impl TransportOpener for TcpOpener {
///     type Transport = TcpTransport;
///     type Error = std::io::Error;
///
///     fn open(&mut self, endpoint: &str) -> Result<TcpTransport, std::io::Error> {
///         TcpTransport::connect(endpoint)
///     }
/// }
/// ```
pub trait TransportOpener {
    /// Transport produced by this opener.
    type Transport: Transport;
    /// Error type for open failures.
    type Error: Display;

    /// Opens the endpoint.
    fn open(&mut self, endpoint: &str) -> Result<Self::Transport, Self::Error>;
}

/// Local wall-clock time.
///
/// Used for the active-hours decision and for the "Last Update" stamp.
pub trait WallClock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Blocking sleep.
///
/// All suspension points of the refresh loop go through this trait: the
/// display settle delay, the retry backoff and the tick interval.
pub trait Delay {
    /// Sleeps for `duration`.
    fn delay(&mut self, duration: Duration);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(bytes)
    }
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}
