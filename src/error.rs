//! Error types for the display bank and the weather fetch.
//!
//! Every error maps onto an [`ErrorKind`] so it can be handed to an
//! [`ErrorObserver`](crate::traits::ErrorObserver).

use crate::traits::ErrorKind;
use thiserror::Error;

/// Failure talking to one display.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The endpoint could not be opened.
    #[error("cannot open display endpoint {endpoint}: {reason}")]
    TransportOpen {
        /// Endpoint identifier (e.g. `/dev/ttyS5`).
        endpoint: String,
        /// Backend error text.
        reason: String,
    },

    /// A write failed part way through a command sequence.
    #[error("write to display endpoint {endpoint} failed: {reason}")]
    TransportWrite {
        /// Endpoint identifier.
        endpoint: String,
        /// Backend error text.
        reason: String,
    },
}

impl DisplayError {
    /// Observer category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DisplayError::TransportOpen { .. } => ErrorKind::TransportOpen,
            DisplayError::TransportWrite { .. } => ErrorKind::TransportWrite,
        }
    }

    /// Endpoint the error happened on.
    pub fn endpoint(&self) -> &str {
        match self {
            DisplayError::TransportOpen { endpoint, .. }
            | DisplayError::TransportWrite { endpoint, .. } => endpoint,
        }
    }
}

/// Failure of a single HTTP attempt. These are retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The server answered with an error status (4xx/5xx).
    #[error("HTTP error status {0}")]
    Http(u16),
    /// The connection could not be established (DNS, refused, reset).
    #[error("connection error: {0}")]
    Connection(String),
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,
    /// Anything else the HTTP client reported.
    #[error("request failed: {0}")]
    Other(String),
}

impl NetworkError {
    /// Observer category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetworkError::Http(_) => ErrorKind::HttpStatus,
            NetworkError::Connection(_) => ErrorKind::Connection,
            NetworkError::Timeout => ErrorKind::Timeout,
            NetworkError::Other(_) => ErrorKind::OtherRequest,
        }
    }
}

/// Final outcome of a failed [`WeatherClient::fetch`](crate::WeatherClient::fetch).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A response arrived with a status other than 200 or 204.
    #[error("API returned status {0}")]
    ApiStatus(u16),

    /// The API answered 204 No Content.
    #[error("API returned no data")]
    NoData,

    /// Every attempt failed before a response was obtained.
    #[error("no response after {attempts} attempts, last error: {last}")]
    ExhaustedRetries {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last: NetworkError,
    },

    /// A 200 response whose body did not hold an observation.
    #[error("malformed observation body: {0}")]
    Parse(String),
}

impl FetchError {
    /// Observer category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::ApiStatus(_) => ErrorKind::ApiStatus,
            FetchError::NoData => ErrorKind::NoData,
            FetchError::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            FetchError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Text shown on the display bank when this error ends a tick.
    ///
    /// ```rust
    /// use vfd_weather::{FetchError, NetworkError};
    ///
    /// assert_eq!(FetchError::ApiStatus(401).banner(), "API Error: 401");
    /// let exhausted = FetchError::ExhaustedRetries { attempts: 30, last: NetworkError::Http(503) };
    /// assert_eq!(exhausted.banner(), "API Error: 503");
    /// ```
    pub fn banner(&self) -> String {
        match self {
            FetchError::ApiStatus(code)
            | FetchError::ExhaustedRetries {
                last: NetworkError::Http(code),
                ..
            } => format!("API Error: {}", code),
            FetchError::NoData => "No data".into(),
            FetchError::ExhaustedRetries { .. } | FetchError::Parse(_) => "Fetch failed".into(),
        }
    }
}

/// Configuration could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held a value of the wrong form.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
    },

    /// A JSON config document could not be parsed.
    #[error("invalid config document: {0}")]
    Json(String),
}
