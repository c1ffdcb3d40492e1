//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `system`: Local wall clock and thread sleep
//! - `serial`: Serial port displays via `serialport` (requires `serial` feature)
//! - `http`: Observation API over `ureq` (requires `http` feature)

pub mod mock;
pub mod system;

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(feature = "http")]
pub mod http;

pub use mock::*;
pub use system::*;

#[cfg(feature = "serial")]
pub use serial::*;

#[cfg(feature = "http")]
pub use http::*;
