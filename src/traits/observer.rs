//! Error reporting.
//!
//! Components do not log failures through global state. They are handed an
//! [`ErrorObserver`] and report `(kind, detail)` pairs to it; the binary
//! plugs in [`TracingObserver`], tests plug in
//! [`RecordingObserver`](crate::hal::RecordingObserver).

use tracing::{error, warn};

/// Category of a reported error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A display endpoint could not be opened.
    TransportOpen,
    /// A write to a display failed.
    TransportWrite,
    /// An HTTP attempt got a 4xx/5xx answer.
    HttpStatus,
    /// An HTTP attempt could not connect.
    Connection,
    /// An HTTP attempt timed out.
    Timeout,
    /// An HTTP attempt failed some other way.
    OtherRequest,
    /// A response had a status other than 200/204.
    ApiStatus,
    /// The API answered 204.
    NoData,
    /// Every fetch attempt failed.
    ExhaustedRetries,
    /// The response body could not be understood.
    Parse,
}

/// How loudly an error should be reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected, transient trouble.
    Warning,
    /// Needs attention.
    Critical,
}

impl ErrorKind {
    /// Severity of this kind.
    ///
    /// HTTP status, connection and timeout failures of a single attempt are
    /// warnings; everything else is critical.
    pub const fn severity(&self) -> Severity {
        match self {
            ErrorKind::HttpStatus | ErrorKind::Connection | ErrorKind::Timeout => {
                Severity::Warning
            }
            _ => Severity::Critical,
        }
    }
}

/// Receives error reports from the core components.
pub trait ErrorObserver {
    /// Called once per failure.
    fn on_error(&mut self, kind: ErrorKind, detail: &str);
}

impl<E: ErrorObserver + ?Sized> ErrorObserver for &mut E {
    fn on_error(&mut self, kind: ErrorKind, detail: &str) {
        (**self).on_error(kind, detail)
    }
}

/// Observer that forwards reports to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ErrorObserver for TracingObserver {
    fn on_error(&mut self, kind: ErrorKind, detail: &str) {
        match kind.severity() {
            Severity::Warning => warn!(?kind, "{}", detail),
            Severity::Critical => error!(?kind, "{}", detail),
        }
    }
}
