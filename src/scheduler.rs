//! The outer control loop and the day/night state machine.
//!
//! # States
//!
//! ```text
//!            hour enters [start, end)
//!   Sleeping ─────────────────────────> Active   (fetch + render every tick)
//!      ^                                   │
//!      └───────────────────────────────────┘
//!         hour leaves [start, end): bank reinitialized once
//! ```
//!
//! Every tick is followed by the same fixed interval, asleep or not.
//!
//! # Error boundary
//!
//! Nothing a tick does is fatal. A failed fetch is reported to the
//! [`ErrorObserver`], the bank is reinitialized and a banner
//! (`API Error: 503`, `No data`, `Fetch failed`) is shown. A failed render
//! is reported and the loop goes on.
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::hal::{MockClock, MockDelay, MockHttp, MockOpener, RecordingObserver};
//! use vfd_weather::{Config, Scheduler, TickOutcome};
//!
//! let mut http = MockHttp::new();
//! http.queue_status(204);
//!
//! let mut scheduler = Scheduler::from_config(
//!     &Config::default(),
//!     MockOpener::new(),
//!     http,
//!     MockClock::at(9, 0),
//!     MockDelay::new(),
//!     RecordingObserver::new(),
//! );
//! scheduler.start();
//!
//! assert!(matches!(scheduler.tick(), TickOutcome::FetchFailed(_)));
//! assert!(scheduler.bank().opener().written_text("/dev/ttyS6").ends_with("No data"));
//! ```

use crate::bank::{DisplayBank, InitFailures};
use crate::config::{Config, ScheduleConfig};
use crate::error::{DisplayError, FetchError};
use crate::traits::{Delay, ErrorObserver, HttpClient, TransportOpener, WallClock};
use crate::weather::WeatherClient;
use chrono::Timelike;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use tracing::{debug, info};

/// Banner written once the bank is up.
pub const RUNNING_BANNER: &str = "Running...";

/// Longest single sleep while waiting out the tick interval.
const WAIT_SLICE: Duration = Duration::from_secs(1);

/// Hours of the day during which the displays show data, `[start, end)`.
///
/// A window with `start > end` wraps past midnight; `start == end` is never
/// active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveHours {
    /// First active hour.
    pub start: u32,
    /// First inactive hour after the window.
    pub end: u32,
}

impl ActiveHours {
    /// Creates a window.
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns true if `hour` falls inside the window.
    ///
    /// ```rust
    /// use vfd_weather::ActiveHours;
    ///
    /// let hours = ActiveHours::new(6, 23);
    /// assert!(!hours.contains(5));
    /// assert!(hours.contains(6));
    /// assert!(hours.contains(22));
    /// assert!(!hours.contains(23));
    /// ```
    pub const fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self::new(6, 23)
    }
}

impl From<&ScheduleConfig> for ActiveHours {
    fn from(config: &ScheduleConfig) -> Self {
        Self::new(config.active_start_hour, config.active_end_hour)
    }
}

/// Day/night state, owned by the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayNightState {
    /// True while outside the active hours.
    pub is_sleeping: bool,
}

/// What one tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Observation fetched and written to every display.
    Rendered,
    /// Observation fetched, but a display write failed.
    RenderFailed(DisplayError),
    /// The fetch failed; a banner was shown instead.
    FetchFailed(FetchError),
    /// Left the active hours on this tick; the bank was reinitialized.
    EnteredSleep,
    /// Still outside the active hours; nothing was done.
    Sleeping,
}

/// Drives the display bank from the weather client.
pub struct Scheduler<O, H, C, D, E>
where
    O: TransportOpener,
    H: HttpClient,
    C: WallClock,
    D: Delay,
    E: ErrorObserver,
{
    bank: DisplayBank<O>,
    client: WeatherClient<H>,
    clock: C,
    delay: D,
    observer: E,
    hours: ActiveHours,
    interval: Duration,
    state: DayNightState,
}

impl<O, H, C, D, E> Scheduler<O, H, C, D, E>
where
    O: TransportOpener,
    H: HttpClient,
    C: WallClock,
    D: Delay,
    E: ErrorObserver,
{
    /// Creates a scheduler. It starts out active.
    pub fn new(
        bank: DisplayBank<O>,
        client: WeatherClient<H>,
        clock: C,
        delay: D,
        observer: E,
        schedule: &ScheduleConfig,
    ) -> Self {
        Self {
            bank,
            client,
            clock,
            delay,
            observer,
            hours: ActiveHours::from(schedule),
            interval: schedule.update_interval(),
            state: DayNightState::default(),
        }
    }

    /// Builds the bank and client from `config` and wires them up.
    pub fn from_config(config: &Config, opener: O, http: H, clock: C, delay: D, observer: E) -> Self {
        let bank = DisplayBank::new(opener, &config.displays, config.schedule.init_settle());
        let client = WeatherClient::new(http, &config.api);
        Self::new(bank, client, clock, delay, observer, &config.schedule)
    }

    /// Opens and initializes the displays, then shows the running banner.
    pub fn start(&mut self) -> InitFailures {
        let failures = self.bank.initialize_all(&mut self.delay, &mut self.observer);
        info!(
            displays = self.bank.channel_count(),
            failed = failures.len(),
            "display bank started"
        );
        self.banner(RUNNING_BANNER);
        failures
    }

    /// Runs one tick at the clock's current hour.
    pub fn tick(&mut self) -> TickOutcome {
        let hour = self.clock.now().hour();
        self.tick_at_hour(hour)
    }

    /// Runs one tick as if the local hour were `hour`.
    pub fn tick_at_hour(&mut self, hour: u32) -> TickOutcome {
        if self.hours.contains(hour) {
            if self.state.is_sleeping {
                self.state.is_sleeping = false;
                info!(hour, "entering active hours");
            }
            return self.refresh();
        }

        if self.state.is_sleeping {
            debug!(hour, "sleeping");
            return TickOutcome::Sleeping;
        }

        self.state.is_sleeping = true;
        info!(hour, "leaving active hours, blanking displays");
        self.bank.reinitialize(&mut self.delay, &mut self.observer);
        TickOutcome::EnteredSleep
    }

    /// Ticks until `shutdown` is set, waiting the update interval after each tick.
    ///
    /// The interval is slept in one-second slices so a shutdown request is
    /// noticed promptly.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(interval_secs = self.interval.as_secs(), "update loop running");
        while !shutdown.load(Ordering::Relaxed) {
            let outcome = self.tick();
            debug!(?outcome, "tick done");
            self.wait(shutdown);
        }
        info!("update loop stopped");
    }

    /// Current day/night state.
    pub fn state(&self) -> DayNightState {
        self.state
    }

    /// Returns true while outside the active hours.
    pub fn is_sleeping(&self) -> bool {
        self.state.is_sleeping
    }

    /// Active window.
    pub fn active_hours(&self) -> ActiveHours {
        self.hours
    }

    /// Borrow the display bank.
    pub fn bank(&self) -> &DisplayBank<O> {
        &self.bank
    }

    /// Borrow the weather client.
    pub fn client(&self) -> &WeatherClient<H> {
        &self.client
    }

    /// Mutably borrow the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Borrow the delay.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Borrow the observer.
    pub fn observer(&self) -> &E {
        &self.observer
    }

    /// Closes every display and returns the opener.
    pub fn close(self) -> O {
        info!(displays = self.bank.channel_count(), "closing displays");
        self.bank.into_opener()
    }

    fn refresh(&mut self) -> TickOutcome {
        match self
            .client
            .fetch(&mut self.delay, &self.clock, &mut self.observer)
        {
            Ok(observation) => {
                let result = self.bank.render(
                    &observation,
                    observation.feels_like_c(),
                    observation.temperature_c(),
                    &observation.last_update(),
                );
                match result {
                    Ok(()) => {
                        info!(at = %observation.last_update(), "displays updated");
                        TickOutcome::Rendered
                    }
                    Err(err) => {
                        self.observer
                            .on_error(err.kind(), &format!("render failed: {}", err));
                        TickOutcome::RenderFailed(err)
                    }
                }
            }
            Err(err) => {
                self.observer.on_error(err.kind(), &err.to_string());
                self.bank.reinitialize(&mut self.delay, &mut self.observer);
                self.banner(&err.banner());
                TickOutcome::FetchFailed(err)
            }
        }
    }

    fn banner(&mut self, text: &str) {
        if let Err(err) = self.bank.show_message(text) {
            self.observer
                .on_error(err.kind(), &format!("banner {:?} not shown: {}", text, err));
        }
    }

    fn wait(&mut self, shutdown: &AtomicBool) {
        let mut remaining = self.interval;
        while !remaining.is_zero() && !shutdown.load(Ordering::Relaxed) {
            let slice = remaining.min(WAIT_SLICE);
            self.delay.delay(slice);
            remaining -= slice;
        }
    }
}

impl<O, H, C, D, E> core::fmt::Debug for Scheduler<O, H, C, D, E>
where
    O: TransportOpener,
    H: HttpClient,
    C: WallClock,
    D: Delay,
    E: ErrorObserver,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("bank", &self.bank)
            .field("hours", &self.hours)
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockDelay, MockHttp, MockOpener, RecordingObserver};
    use crate::traits::ErrorKind;

    type TestScheduler =
        Scheduler<MockOpener, MockHttp, MockClock, MockDelay, RecordingObserver>;

    const BODY: &str = r#"{"observations":[{"humidity":65,"imperial":{"temp":50,"windSpeed":5,"windChill":45,"heatIndex":50}}]}"#;

    fn scheduler(http: MockHttp) -> TestScheduler {
        let mut s = Scheduler::from_config(
            &Config::default(),
            MockOpener::new(),
            http,
            MockClock::new(),
            MockDelay::new(),
            RecordingObserver::new(),
        );
        s.start();
        s
    }

    // =========================================================================
    // ActiveHours
    // =========================================================================

    #[test]
    fn active_hours_boundaries() {
        let hours = ActiveHours::default();
        assert!(!hours.contains(0));
        assert!(!hours.contains(5));
        assert!(hours.contains(6));
        assert!(hours.contains(22));
        assert!(!hours.contains(23));
    }

    #[test]
    fn active_hours_wrap_midnight() {
        let hours = ActiveHours::new(22, 2);
        assert!(hours.contains(23));
        assert!(hours.contains(1));
        assert!(!hours.contains(2));
        assert!(!hours.contains(12));
    }

    #[test]
    fn active_hours_empty_window() {
        let hours = ActiveHours::new(8, 8);
        assert!((0..24).all(|h| !hours.contains(h)));
    }

    // =========================================================================
    // State machine
    // =========================================================================

    #[test]
    fn starts_active_and_writes_banner() {
        let s = scheduler(MockHttp::new());
        assert!(!s.is_sleeping());
        assert!(s.bank().opener().written_text("/dev/ttyS6").ends_with(RUNNING_BANNER));
    }

    #[test]
    fn boundary_transitions() {
        let mut http = MockHttp::new();
        http.queue_ok(BODY);
        http.queue_ok(BODY);
        let mut s = scheduler(http);

        assert_eq!(s.tick_at_hour(5), TickOutcome::EnteredSleep);
        assert!(s.is_sleeping());
        assert_eq!(s.tick_at_hour(6), TickOutcome::Rendered);
        assert!(!s.is_sleeping());
        assert_eq!(s.tick_at_hour(22), TickOutcome::Rendered);
        assert_eq!(s.tick_at_hour(23), TickOutcome::EnteredSleep);
        assert!(s.is_sleeping());
    }

    #[test]
    fn sleeping_reinitializes_once() {
        let mut s = scheduler(MockHttp::new());
        let opens_before = s.bank().opener().opened.len();
        let settle_before = s.delay().count(Duration::from_secs(1));

        assert_eq!(s.tick_at_hour(23), TickOutcome::EnteredSleep);
        assert_eq!(s.tick_at_hour(0), TickOutcome::Sleeping);
        assert_eq!(s.tick_at_hour(3), TickOutcome::Sleeping);

        // one settle per channel, once
        assert_eq!(s.delay().count(Duration::from_secs(1)) - settle_before, 3);
        assert_eq!(s.bank().opener().opened.len(), opens_before);
        assert!(s.client().http().requests.is_empty());
    }

    #[test]
    fn tick_uses_clock_hour() {
        let mut s = scheduler(MockHttp::new());
        s.clock_mut().set_time(2, 30);
        assert_eq!(s.tick(), TickOutcome::EnteredSleep);
    }

    // =========================================================================
    // Error boundary
    // =========================================================================

    #[test]
    fn api_status_banner() {
        let mut http = MockHttp::new();
        http.queue_status(401);
        let mut s = scheduler(http);

        assert_eq!(
            s.tick_at_hour(12),
            TickOutcome::FetchFailed(FetchError::ApiStatus(401))
        );
        assert!(s
            .bank()
            .opener()
            .written_text("/dev/ttyS6")
            .ends_with("API Error: 401"));
        assert_eq!(s.observer().kinds(), vec![ErrorKind::ApiStatus]);
    }

    #[test]
    fn banner_follows_reinit() {
        let mut http = MockHttp::new();
        http.queue_status(204);
        let mut s = scheduler(http);
        s.bank().opener().transport("/dev/ttyS6").unwrap().clear_log();

        s.tick_at_hour(12);

        let writes = s.bank().opener().transport("/dev/ttyS6").unwrap().writes();
        assert_eq!(writes.first(), Some(&vec![0x1B, 0x05]));
        assert_eq!(writes.last(), Some(&b"No data".to_vec()));
    }

    #[test]
    fn render_failure_is_reported() {
        let mut http = MockHttp::new();
        http.queue_ok(BODY);
        let mut s = scheduler(http);
        s.bank().opener().transport("/dev/ttyS7").unwrap().fail_after(0);

        let outcome = s.tick_at_hour(12);
        assert!(matches!(outcome, TickOutcome::RenderFailed(_)));
        assert_eq!(s.observer().kinds(), vec![ErrorKind::TransportWrite]);
        assert!(s
            .bank()
            .opener()
            .written_text("/dev/ttyS5")
            .contains("Feels Like : 7.2 C"));
    }

    // =========================================================================
    // Run loop
    // =========================================================================

    #[test]
    fn run_returns_immediately_when_shut_down() {
        let mut s = scheduler(MockHttp::new());
        let shutdown = AtomicBool::new(true);
        s.run(&shutdown);
        assert!(s.client().http().requests.is_empty());
    }

    #[test]
    fn close_releases_ports() {
        let s = scheduler(MockHttp::new());
        let opener = s.close();
        for ep in ["/dev/ttyS5", "/dev/ttyS7", "/dev/ttyS6"] {
            assert!(opener.transport(ep).unwrap().is_closed());
        }
    }
}
