//! Network abstraction for the observation API.
//!
//! The weather client needs exactly one thing from the network: a blocking
//! GET with a timeout. Implementations classify their native failures into
//! [`NetworkError`] so the retry loop can log them at the right severity.
//!
//! | Outcome | Returned as |
//! |---------|-------------|
//! | Any 1xx/2xx/3xx answer | `Ok(HttpResponse)` |
//! | 4xx/5xx answer | `Err(NetworkError::Http(code))` |
//! | DNS / refused / reset | `Err(NetworkError::Connection(_))` |
//! | Timed out | `Err(NetworkError::Timeout)` |
//! | Anything else | `Err(NetworkError::Other(_))` |

use crate::error::NetworkError;
use core::time::Duration;

/// Blocking HTTP client.
pub trait HttpClient {
    /// Performs a GET request, giving up after `timeout`.
    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, NetworkError>;
}

/// A response obtained from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Creates a 204 No Content response.
    pub fn no_content() -> Self {
        Self::new(204, Vec::new())
    }

    /// Returns the body as a UTF-8 string, if valid.
    pub fn body_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }
}

impl<H: HttpClient + ?Sized> HttpClient for &mut H {
    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, NetworkError> {
        (**self).get(url, timeout)
    }
}
