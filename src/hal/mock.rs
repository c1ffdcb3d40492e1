//! Mock implementations for testing without hardware or network.
//!
//! This module provides test doubles for every trait in [`crate::traits`],
//! so the full refresh cycle can run on a desktop in a unit test.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTransport`] | [`Transport`] | Records every write, can fail on demand |
//! | [`MockOpener`] | [`TransportOpener`] | Hands out mock transports, can refuse endpoints |
//! | [`MockHttp`] | [`HttpClient`] | Scripted per-attempt results |
//! | [`MockClock`] | [`WallClock`] | Settable local time |
//! | [`MockDelay`] | [`Delay`] | Records sleeps instead of sleeping |
//! | [`RecordingObserver`] | [`ErrorObserver`] | Collects error reports |
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::hal::{MockDelay, MockOpener, RecordingObserver};
//! use vfd_weather::{Config, DisplayBank};
//!
//! let config = Config::default();
//! let opener = MockOpener::new().refuse("/dev/ttyS7");
//! let mut bank = DisplayBank::new(opener, &config.displays, config.schedule.init_settle());
//!
//! let mut observer = RecordingObserver::new();
//! let failures = bank.initialize_all(&mut MockDelay::new(), &mut observer);
//!
//! // Middle display failed, the other two are up
//! assert_eq!(failures.len(), 1);
//! assert_eq!(bank.channel_count(), 2);
//! ```
//!
//! [`Transport`]: crate::traits::Transport
//! [`TransportOpener`]: crate::traits::TransportOpener
//! [`HttpClient`]: crate::traits::HttpClient
//! [`WallClock`]: crate::traits::WallClock
//! [`Delay`]: crate::traits::Delay
//! [`ErrorObserver`]: crate::traits::ErrorObserver

use crate::error::NetworkError;
use crate::traits::{
    Delay, ErrorKind, ErrorObserver, HttpClient, HttpResponse, Transport, TransportOpener,
    WallClock,
};
use chrono::{NaiveDate, NaiveDateTime};
use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

// ============================================================================
// Display Mocks
// ============================================================================

/// Mock display transport.
///
/// Clones share the same log, so a test can keep a handle while the bank
/// owns the transport.
///
/// # Example
///
/// ```rust
/// use vfd_weather::hal::MockTransport;
/// use vfd_weather::traits::Transport;
///
/// let mut port = MockTransport::new();
/// let handle = port.clone();
///
/// port.write_all(&[0x1B, 0x02]).unwrap();
/// port.write_all(b"hi").unwrap();
///
/// assert_eq!(handle.writes(), vec![vec![0x1B, 0x02], b"hi".to_vec()]);
/// assert_eq!(handle.written(), vec![0x1B, 0x02, b'h', b'i']);
///
/// handle.fail_after(0);
/// assert!(port.write_all(b"x").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    log: Rc<RefCell<Vec<Vec<u8>>>>,
    fail_after: Rc<Cell<Option<usize>>>,
    closed: Rc<Cell<bool>>,
}

impl MockTransport {
    /// Creates a transport that accepts every write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `count` more successful writes through in total, then fails.
    pub fn fail_after(&self, count: usize) {
        self.fail_after.set(Some(count));
    }

    /// Makes every write succeed again.
    pub fn heal(&self) {
        self.fail_after.set(None);
    }

    /// Every successful write, one entry per call.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log.borrow().clone()
    }

    /// All successfully written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.log.borrow().concat()
    }

    /// Written bytes as lossy UTF-8 (handy for asserting on text).
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written()).into_owned()
    }

    /// Forgets everything written so far.
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Returns true once the owning side has dropped its transport.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Transport for MockTransport {
    type Error = &'static str;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), &'static str> {
        if let Some(remaining) = self.fail_after.get() {
            if remaining == 0 {
                return Err("mock write failure");
            }
            self.fail_after.set(Some(remaining - 1));
        }
        self.log.borrow_mut().push(bytes.to_vec());
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        // Only the last holder besides the opener marks the port closed.
        if Rc::strong_count(&self.closed) == 2 {
            self.closed.set(true);
        }
    }
}

/// Mock transport opener.
///
/// Keeps a handle to every transport it opens so tests can inspect what was
/// written per endpoint.
#[derive(Debug, Default)]
pub struct MockOpener {
    /// Endpoints in the order they were opened (repeats included).
    pub opened: Vec<String>,
    refused: Vec<String>,
    fail_writes: HashMap<String, usize>,
    transports: HashMap<String, MockTransport>,
}

impl MockOpener {
    /// Creates an opener that opens anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to open `endpoint`.
    pub fn refuse(mut self, endpoint: &str) -> Self {
        self.refused.push(endpoint.into());
        self
    }

    /// Transports opened on `endpoint` fail after `count` writes.
    pub fn fail_writes_after(mut self, endpoint: &str, count: usize) -> Self {
        self.fail_writes.insert(endpoint.into(), count);
        self
    }

    /// Number of times `endpoint` was opened.
    pub fn open_count(&self, endpoint: &str) -> usize {
        self.opened.iter().filter(|e| *e == endpoint).count()
    }

    /// Handle to the most recent transport opened on `endpoint`.
    pub fn transport(&self, endpoint: &str) -> Option<&MockTransport> {
        self.transports.get(endpoint)
    }

    /// Bytes written to `endpoint` (empty if never opened).
    pub fn written(&self, endpoint: &str) -> Vec<u8> {
        self.transport(endpoint)
            .map(MockTransport::written)
            .unwrap_or_default()
    }

    /// Text written to `endpoint`, lossy UTF-8.
    pub fn written_text(&self, endpoint: &str) -> String {
        String::from_utf8_lossy(&self.written(endpoint)).into_owned()
    }
}

impl TransportOpener for MockOpener {
    type Transport = MockTransport;
    type Error = &'static str;

    fn open(&mut self, endpoint: &str) -> Result<MockTransport, &'static str> {
        if self.refused.iter().any(|e| e == endpoint) {
            return Err("no such device");
        }
        let transport = MockTransport::new();
        if let Some(&count) = self.fail_writes.get(endpoint) {
            transport.fail_after(count);
        }
        self.opened.push(endpoint.into());
        self.transports.insert(endpoint.into(), transport.clone());
        Ok(transport)
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock HTTP client.
///
/// Each `get` pops the next scripted result; an empty script answers with
/// `NetworkError::Other`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use vfd_weather::hal::MockHttp;
/// use vfd_weather::traits::HttpClient;
/// use vfd_weather::NetworkError;
///
/// let mut http = MockHttp::new();
/// http.queue_errors(NetworkError::Timeout, 2);
/// http.queue_status(204);
///
/// let t = Duration::from_secs(3);
/// assert_eq!(http.get("u", t), Err(NetworkError::Timeout));
/// assert_eq!(http.get("u", t), Err(NetworkError::Timeout));
/// assert_eq!(http.get("u", t).unwrap().status, 204);
/// assert_eq!(http.requests.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct MockHttp {
    /// Results still to be handed out.
    pub script: VecDeque<Result<HttpResponse, NetworkError>>,
    /// Requests made so far (url, timeout).
    pub requests: Vec<(String, Duration)>,
}

impl MockHttp {
    /// Creates a client with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with `body`.
    pub fn queue_ok(&mut self, body: &str) {
        self.script.push_back(Ok(HttpResponse::ok(body)));
    }

    /// Queue an empty response with `status`.
    pub fn queue_status(&mut self, status: u16) {
        self.script
            .push_back(Ok(HttpResponse::new(status, Vec::new())));
    }

    /// Queue one failed attempt.
    pub fn queue_error(&mut self, error: NetworkError) {
        self.script.push_back(Err(error));
    }

    /// Queue `count` identical failed attempts.
    pub fn queue_errors(&mut self, error: NetworkError, count: usize) {
        for _ in 0..count {
            self.script.push_back(Err(error.clone()));
        }
    }
}

impl HttpClient for MockHttp {
    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, NetworkError> {
        self.requests.push((url.into(), timeout));
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(NetworkError::Other("no scripted response".into())))
    }
}

// ============================================================================
// Time Mocks
// ============================================================================

/// Mock wall clock. Starts at noon on 1970-01-01.
///
/// # Example
///
/// ```rust
/// use chrono::Timelike;
/// use vfd_weather::hal::MockClock;
/// use vfd_weather::traits::WallClock;
///
/// let mut clock = MockClock::at(5, 30);
/// assert_eq!(clock.now().hour(), 5);
///
/// clock.set_time(23, 0);
/// assert_eq!(clock.now().hour(), 23);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MockClock {
    now: NaiveDateTime,
}

impl MockClock {
    /// Creates a clock at 12:00.
    pub fn new() -> Self {
        Self::at(12, 0)
    }

    /// Creates a clock at `hour:minute`.
    pub fn at(hour: u32, minute: u32) -> Self {
        let mut clock = Self {
            now: NaiveDateTime::default(),
        };
        clock.set_time(hour, minute);
        clock
    }

    /// Moves the clock to `hour:minute` on the same day.
    ///
    /// Invalid times leave the clock unchanged.
    pub fn set_time(&mut self, hour: u32, minute: u32) {
        if let Some(now) = NaiveDate::default().and_hms_opt(hour, minute, 0) {
            self.now = now;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for MockClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

/// Mock delay: records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Every requested sleep, in order.
    pub delays: Vec<Duration>,
}

impl MockDelay {
    /// Creates a delay with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested sleeps.
    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Number of sleeps equal to `duration`.
    pub fn count(&self, duration: Duration) -> usize {
        self.delays.iter().filter(|d| **d == duration).count()
    }
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}

// ============================================================================
// Observer Mocks
// ============================================================================

/// Observer that keeps every report.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// Reports in arrival order.
    pub events: Vec<(ErrorKind, String)>,
}

impl RecordingObserver {
    /// Creates an empty observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports of `kind`.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.events.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Kinds in arrival order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.events.iter().map(|(k, _)| *k).collect()
    }
}

impl ErrorObserver for RecordingObserver {
    fn on_error(&mut self, kind: ErrorKind, detail: &str) {
        self.events.push((kind, detail.into()));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    // =========================================================================
    // MockTransport Tests
    // =========================================================================

    #[test]
    fn mock_transport_records_per_write() {
        let mut t = MockTransport::new();
        t.write_all(&[1, 2]).unwrap();
        t.write_all(&[3]).unwrap();
        assert_eq!(t.writes(), vec![vec![1, 2], vec![3]]);
        assert_eq!(t.written(), vec![1, 2, 3]);
    }

    #[test]
    fn mock_transport_fail_after() {
        let mut t = MockTransport::new();
        t.fail_after(1);
        assert!(t.write_all(b"a").is_ok());
        assert!(t.write_all(b"b").is_err());
        assert!(t.write_all(b"c").is_err());
        assert_eq!(t.written(), b"a".to_vec());

        t.heal();
        assert!(t.write_all(b"d").is_ok());
    }

    #[test]
    fn mock_transport_clear_log() {
        let mut t = MockTransport::new();
        t.write_all(b"abc").unwrap();
        t.clear_log();
        assert!(t.writes().is_empty());
    }

    // =========================================================================
    // MockOpener Tests
    // =========================================================================

    #[test]
    fn mock_opener_tracks_opens() {
        let mut opener = MockOpener::new();
        let mut a = opener.open("/dev/a").unwrap();
        a.write_all(b"x").unwrap();
        assert_eq!(opener.open_count("/dev/a"), 1);
        assert_eq!(opener.written("/dev/a"), b"x".to_vec());
        assert!(opener.written("/dev/b").is_empty());
    }

    #[test]
    fn mock_opener_refuses() {
        let mut opener = MockOpener::new().refuse("/dev/bad");
        assert!(opener.open("/dev/bad").is_err());
        assert_eq!(opener.open_count("/dev/bad"), 0);
    }

    #[test]
    fn mock_opener_write_failures() {
        let mut opener = MockOpener::new().fail_writes_after("/dev/a", 0);
        let mut a = opener.open("/dev/a").unwrap();
        assert!(a.write_all(b"x").is_err());
    }

    #[test]
    fn mock_opener_sees_close() {
        let mut opener = MockOpener::new();
        let a = opener.open("/dev/a").unwrap();
        assert!(!opener.transport("/dev/a").unwrap().is_closed());
        drop(a);
        assert!(opener.transport("/dev/a").unwrap().is_closed());
    }

    // =========================================================================
    // MockHttp Tests
    // =========================================================================

    #[test]
    fn mock_http_empty_script() {
        let mut http = MockHttp::new();
        let result = http.get("http://x", Duration::from_secs(3));
        assert!(matches!(result, Err(NetworkError::Other(_))));
        assert_eq!(http.requests[0].1, Duration::from_secs(3));
    }

    #[test]
    fn mock_http_in_order() {
        let mut http = MockHttp::new();
        http.queue_error(NetworkError::Http(503));
        http.queue_ok("{}");
        assert_eq!(
            http.get("u", Duration::ZERO),
            Err(NetworkError::Http(503))
        );
        assert_eq!(http.get("u", Duration::ZERO).unwrap().body, b"{}".to_vec());
    }

    // =========================================================================
    // MockClock / MockDelay Tests
    // =========================================================================

    #[test]
    fn mock_clock_default_is_noon() {
        assert_eq!(MockClock::new().now().hour(), 12);
    }

    #[test]
    fn mock_clock_ignores_invalid_time() {
        let mut clock = MockClock::at(7, 15);
        clock.set_time(25, 0);
        assert_eq!(clock.now().hour(), 7);
        assert_eq!(clock.now().minute(), 15);
    }

    #[test]
    fn mock_delay_totals() {
        let mut delay = MockDelay::new();
        delay.delay(Duration::from_secs(2));
        delay.delay(Duration::from_secs(2));
        delay.delay(Duration::from_secs(1));
        assert_eq!(delay.total(), Duration::from_secs(5));
        assert_eq!(delay.count(Duration::from_secs(2)), 2);
    }

    // =========================================================================
    // RecordingObserver Tests
    // =========================================================================

    #[test]
    fn recording_observer_counts() {
        let mut obs = RecordingObserver::new();
        obs.on_error(ErrorKind::Timeout, "a");
        obs.on_error(ErrorKind::Timeout, "b");
        obs.on_error(ErrorKind::NoData, "c");
        assert_eq!(obs.count(ErrorKind::Timeout), 2);
        assert_eq!(
            obs.kinds(),
            vec![ErrorKind::Timeout, ErrorKind::Timeout, ErrorKind::NoData]
        );
    }
}
