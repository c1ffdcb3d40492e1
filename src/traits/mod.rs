//! Trait definitions for the capabilities the core consumes.
//!
//! The display bank, weather client and scheduler never touch a serial port,
//! socket or system clock directly. They go through these seams so the whole
//! refresh cycle can run against the mocks in [`crate::hal::mock`].
//!
//! # Submodules
//!
//! - `hardware`: byte transports, the opener that creates them, wall clock, delay
//! - `network`: blocking HTTP GET
//! - `observer`: error reporting
//!
//! # Key Traits
//!
//! | Trait | Purpose | Real backend |
//! |-------|---------|--------------|
//! | [`Transport`] | Write bytes to one display | `hal::SerialTransport` |
//! | [`TransportOpener`] | Open a transport by endpoint id | `hal::SerialOpener` |
//! | [`HttpClient`] | Fetch the observation body | `hal::UreqClient` |
//! | [`WallClock`] | Local time for scheduling and timestamps | `hal::SystemClock` |
//! | [`Delay`] | Fixed-duration sleeps | `hal::ThreadDelay` |
//! | [`ErrorObserver`] | Error reporting | [`TracingObserver`] |

pub mod hardware;
pub mod network;
pub mod observer;

pub use hardware::*;
pub use network::*;
pub use observer::*;
