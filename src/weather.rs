//! Weather observations and the retrying client that fetches them.
//!
//! # Fetch algorithm
//!
//! 1. Up to `max_retries` attempts, each a GET with a short timeout.
//! 2. A failed attempt is reported to the [`ErrorObserver`] (HTTP status,
//!    connection and timeout failures as warnings, anything else as
//!    critical) and followed by a fixed backoff before the next attempt.
//! 3. The first response ends the loop. 204 → [`FetchError::NoData`],
//!    any other non-200 → [`FetchError::ApiStatus`], 200 → parse.
//! 4. If no attempt ever produced a response the result is
//!    [`FetchError::ExhaustedRetries`].
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::hal::{MockClock, MockDelay, MockHttp, RecordingObserver};
//! use vfd_weather::{ApiConfig, NetworkError, WeatherClient};
//!
//! let mut http = MockHttp::new();
//! http.queue_error(NetworkError::Timeout);
//! http.queue_ok(r#"{"observations":[{"humidity":40,"imperial":{"temp":90,"windSpeed":3,"windChill":90,"heatIndex":95}}]}"#);
//!
//! let mut client = WeatherClient::new(http, &ApiConfig::default());
//! let mut observer = RecordingObserver::new();
//! let obs = client
//!     .fetch(&mut MockDelay::new(), &MockClock::at(14, 5), &mut observer)
//!     .unwrap();
//!
//! assert_eq!(obs.feels_like_f(), 95.0);
//! assert_eq!(obs.last_update(), "14:05");
//! assert_eq!(observer.events.len(), 1); // the timeout
//! ```

use crate::config::ApiConfig;
use crate::error::{FetchError, NetworkError};
use crate::messages::ObservationResponse;
use crate::traits::{Delay, ErrorObserver, HttpClient, HttpResponse, WallClock};
use chrono::NaiveDateTime;
use core::time::Duration;
use tracing::{debug, info};

/// One observation snapshot. Derived values are computed on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherObservation {
    /// Air temperature, whole °F (truncated toward zero).
    pub temperature_f: i32,
    /// Wind speed, mph.
    pub wind_speed_mph: f64,
    /// Wind chill, °F.
    pub wind_chill_f: f64,
    /// Heat index, °F.
    pub heat_index_f: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
    /// Local wall-clock time the observation was fetched.
    pub observed_at: NaiveDateTime,
}

impl WeatherObservation {
    /// Feels-like temperature in °F, see [`feels_like`].
    pub fn feels_like_f(&self) -> f64 {
        feels_like(
            f64::from(self.temperature_f),
            self.wind_chill_f,
            self.heat_index_f,
        )
    }

    /// Temperature in °C.
    pub fn temperature_c(&self) -> f64 {
        fahrenheit_to_celsius(f64::from(self.temperature_f))
    }

    /// Feels-like temperature in °C.
    pub fn feels_like_c(&self) -> f64 {
        fahrenheit_to_celsius(self.feels_like_f())
    }

    /// Capture time as `HH:MM`.
    pub fn last_update(&self) -> String {
        self.observed_at.format("%H:%M").to_string()
    }
}

/// Feels-like temperature.
///
/// Starts from `temperature`; a lower wind chill replaces it, then a higher
/// heat index replaces whatever the first check left. Both checks always run
/// against the raw temperature.
///
/// ```rust
/// use vfd_weather::weather::feels_like;
///
/// assert_eq!(feels_like(50.0, 45.0, 50.0), 45.0);
/// assert_eq!(feels_like(90.0, 90.0, 95.0), 95.0);
/// assert_eq!(feels_like(70.0, 75.0, 65.0), 70.0);
/// ```
pub fn feels_like(temperature: f64, wind_chill: f64, heat_index: f64) -> f64 {
    let mut feels = temperature;
    if wind_chill < temperature {
        feels = wind_chill;
    }
    if heat_index > temperature {
        feels = heat_index;
    }
    feels
}

/// `(F - 32) * 5 / 9`.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Builds an observation from a 200 response body.
pub fn parse_observation(
    body: &[u8],
    observed_at: NaiveDateTime,
) -> Result<WeatherObservation, FetchError> {
    let response: ObservationResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let record = response
        .observations
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("no observation records".into()))?;

    let imperial = record.imperial;
    let temp = imperial
        .temp
        .ok_or_else(|| FetchError::Parse("missing imperial.temp".into()))?;
    let wind_speed = imperial
        .wind_speed
        .ok_or_else(|| FetchError::Parse("missing imperial.windSpeed".into()))?;
    let humidity = record
        .humidity
        .ok_or_else(|| FetchError::Parse("missing humidity".into()))?;

    let temperature_f = temp.trunc() as i32;
    let raw = f64::from(temperature_f);

    Ok(WeatherObservation {
        temperature_f,
        wind_speed_mph: wind_speed,
        wind_chill_f: imperial.wind_chill.unwrap_or(raw),
        heat_index_f: imperial.heat_index.unwrap_or(raw),
        humidity_pct: humidity,
        observed_at,
    })
}

/// Bookkeeping for one `fetch` call.
#[derive(Debug, Default)]
struct RetryState {
    attempt_count: u32,
    last_error: Option<NetworkError>,
}

/// Fetches observations with bounded retry.
pub struct WeatherClient<H: HttpClient> {
    http: H,
    url: String,
    timeout: Duration,
    backoff: Duration,
    max_retries: u32,
}

impl<H: HttpClient> WeatherClient<H> {
    /// Creates a client for the endpoint described by `config`.
    pub fn new(http: H, config: &ApiConfig) -> Self {
        Self {
            http,
            url: config.url(),
            timeout: config.timeout(),
            backoff: config.retry_backoff(),
            max_retries: config.max_retries,
        }
    }

    /// Request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Attempt cap per fetch.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Borrow the HTTP client.
    pub fn http(&self) -> &H {
        &self.http
    }

    /// Fetches one observation.
    ///
    /// `clock` stamps the observation at the moment the response arrives.
    pub fn fetch<D, C, E>(
        &mut self,
        delay: &mut D,
        clock: &C,
        observer: &mut E,
    ) -> Result<WeatherObservation, FetchError>
    where
        D: Delay + ?Sized,
        C: WallClock + ?Sized,
        E: ErrorObserver + ?Sized,
    {
        let mut retry = RetryState::default();

        while retry.attempt_count < self.max_retries {
            retry.attempt_count += 1;
            debug!(attempt = retry.attempt_count, "fetching observation");

            match self.http.get(&self.url, self.timeout) {
                Ok(response) => return self.validate(response, clock.now()),
                Err(err) => {
                    observer.on_error(
                        err.kind(),
                        &format!(
                            "observation fetch attempt {}/{} failed: {}",
                            retry.attempt_count, self.max_retries, err
                        ),
                    );
                    retry.last_error = Some(err);
                    if retry.attempt_count < self.max_retries {
                        delay.delay(self.backoff);
                    }
                }
            }
        }

        Err(FetchError::ExhaustedRetries {
            attempts: retry.attempt_count,
            last: retry
                .last_error
                .unwrap_or_else(|| NetworkError::Other("no attempt made".into())),
        })
    }

    fn validate(
        &self,
        response: HttpResponse,
        observed_at: NaiveDateTime,
    ) -> Result<WeatherObservation, FetchError> {
        match response.status {
            200 => {
                let observation = parse_observation(&response.body, observed_at)?;
                info!(
                    temperature_f = observation.temperature_f,
                    humidity = observation.humidity_pct,
                    "observation received"
                );
                Ok(observation)
            }
            204 => Err(FetchError::NoData),
            status => Err(FetchError::ApiStatus(status)),
        }
    }
}

impl<H: HttpClient + core::fmt::Debug> core::fmt::Debug for WeatherClient<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // url carries the API key
        f.debug_struct("WeatherClient")
            .field("http", &self.http)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
