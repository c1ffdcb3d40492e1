//! # vfd-weather
//!
//! Current weather observations on a bank of three serial
//! vacuum-fluorescent character displays (2 rows × 20 characters each).
//!
//! ## Features
//!
//! - **Display protocol**: escape-prefixed command frames, including the
//!   controller's double cursor-positioning quirk
//! - **Role-keyed display bank**: top / middle / bottom, one channel per
//!   distinct endpoint, failures isolated per display
//! - **Bounded-retry weather fetch**: per-attempt error classification,
//!   fixed backoff, explicit "retries exhausted" outcome
//! - **Day/night scheduling**: data only inside the active hours, displays
//!   blanked once when leaving them
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Transport, HTTP, clock, delay and observer abstractions
//! - `protocol` - Command frames
//! - `channel` - One display over one transport
//! - `bank` - The three role-keyed displays
//! - `weather` - Observation type and the retrying client
//! - `scheduler` - Outer loop and day/night state
//! - `hal` - Concrete implementations (mock for testing, serial/ureq/system for real use)
//!
//! ## Example
//!
//! ```rust
//! use vfd_weather::hal::{MockClock, MockDelay, MockHttp, MockOpener, RecordingObserver};
//! use vfd_weather::{Config, Scheduler, TickOutcome};
//!
//! let mut http = MockHttp::new();
//! http.queue_ok(r#"{"observations":[{"humidity":65,"imperial":{"temp":50,"windSpeed":5,"windChill":45,"heatIndex":50}}]}"#);
//!
//! let mut scheduler = Scheduler::from_config(
//!     &Config::default(),
//!     MockOpener::new(),
//!     http,
//!     MockClock::at(14, 5),
//!     MockDelay::new(),
//!     RecordingObserver::new(),
//! );
//! scheduler.start();
//! assert_eq!(scheduler.tick(), TickOutcome::Rendered);
//!
//! let top = scheduler.bank().opener().written_text("/dev/ttyS5");
//! assert!(top.contains("Temperature: 10.0 C"));
//! assert!(top.contains("Feels Like : 7.2 C"));
//! ```

#![warn(missing_docs)]

/// Display bank keyed by role.
pub mod bank;
/// A single display channel.
pub mod channel;
/// Application configuration.
pub mod config;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Wire types of the observation API.
pub mod messages;
/// Display command frames.
pub mod protocol;
/// Outer loop and day/night state machine.
pub mod scheduler;
/// Core traits for hardware, network and error reporting.
pub mod traits;
/// Weather observations and the retrying client.
pub mod weather;

// Re-exports for convenience
pub use bank::{DisplayBank, DisplayRole};
pub use channel::{ChannelState, DisplayChannel};
pub use config::{ApiConfig, Config, DisplayConfig, ScheduleConfig};
pub use error::{ConfigError, DisplayError, FetchError, NetworkError};
pub use protocol::{Command, ScreensaverMode};
pub use scheduler::{ActiveHours, DayNightState, Scheduler, TickOutcome};
pub use traits::{
    // Hardware
    Delay,
    // Observer
    ErrorKind,
    ErrorObserver,
    // Network
    HttpClient,
    HttpResponse,
    Severity,
    Transport,
    TransportOpener,
    TracingObserver,
    WallClock,
};
pub use weather::{WeatherClient, WeatherObservation};
