//! Observation API client over `ureq`.
//!
//! Maps `ureq`'s error model onto [`NetworkError`]:
//!
//! - `Error::Status(code, _)` (4xx/5xx) → `Http(code)`
//! - DNS / connect failures → `Connection`
//! - I/O timeouts (while connecting or reading the body) → `Timeout`
//! - everything else → `Other`
//!
//! Bodies are read up to [`MAX_BODY_BYTES`]; anything past that is dropped
//! and left for the JSON parser to reject.

use crate::error::NetworkError;
use crate::traits::{HttpClient, HttpResponse};
use core::time::Duration;
use std::error::Error as _;
use std::io::{self, Read};

/// Largest response body read into memory.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Blocking HTTPS client.
#[derive(Clone, Debug)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client with default agent settings.
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("vfd-weather/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, NetworkError> {
        match self.agent.get(url).timeout(timeout).call() {
            Ok(response) => {
                let status = response.status();
                let body = read_body(response.into_reader())?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(code, _)) => Err(NetworkError::Http(code)),
            Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport)),
        }
    }
}

fn read_body<R: Read>(reader: R) -> Result<Vec<u8>, NetworkError> {
    let mut body = Vec::new();
    reader
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
        .map_err(|e| classify_io(&e))?;
    Ok(body)
}

fn classify_transport(transport: &ureq::Transport) -> NetworkError {
    if let Some(io_err) = transport
        .source()
        .and_then(|s| s.downcast_ref::<io::Error>())
    {
        if is_timeout(io_err) {
            return NetworkError::Timeout;
        }
    }
    match transport.kind() {
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
            NetworkError::Connection(transport.to_string())
        }
        ureq::ErrorKind::Io => classify_message(transport.to_string()),
        _ => NetworkError::Other(transport.to_string()),
    }
}

fn classify_io(err: &io::Error) -> NetworkError {
    if is_timeout(err) {
        NetworkError::Timeout
    } else {
        classify_message(err.to_string())
    }
}

fn classify_message(message: String) -> NetworkError {
    if message.contains("timed out") {
        NetworkError::Timeout
    } else {
        NetworkError::Connection(message)
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
