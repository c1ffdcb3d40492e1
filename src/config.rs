//! Configuration for the display bank, the observation API and the loop timing.
//!
//! Uses `heapless::String` for the fixed-size text fields, the same way on
//! every target.
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::config::{ApiConfig, Config, DisplayConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.displays.top.as_str(), "/dev/ttyS5");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_displays(DisplayConfig::default().with_middle("/dev/ttyUSB0"))
//!     .with_api(ApiConfig::default().with_station("KXXLOCAL1").with_api_key("abc"));
//! assert!(config.api.is_configured());
//! ```

use crate::error::ConfigError;
use core::time::Duration;
use heapless::String as HString;
use serde::{Deserialize, Serialize};

/// Maximum length for short config strings (endpoints, station ids, keys)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (URLs)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Environment variable naming the top display endpoint.
pub const ENV_TOP: &str = "VFD_TOP";
/// Environment variable naming the middle display endpoint.
pub const ENV_MIDDLE: &str = "VFD_MIDDLE";
/// Environment variable naming the bottom display endpoint.
pub const ENV_BOTTOM: &str = "VFD_BOTTOM";
/// Environment variable holding the serial baud rate.
pub const ENV_BAUD: &str = "VFD_BAUD";
/// Environment variable holding the weather station id.
pub const ENV_STATION_ID: &str = "WU_STATION_ID";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "WU_API_KEY";

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let _ = hs.push_str(&s[..fit(s, MAX_SHORT_STRING)]);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let _ = hs.push_str(&s[..fit(s, MAX_LONG_STRING)]);
    hs
}

/// Trimmed environment value as a ShortString, rejecting values that do not fit.
fn env_string(var: &'static str, value: &str) -> Result<ShortString, ConfigError> {
    ShortString::try_from(value.trim()).map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// Largest prefix length of `s` that is at most `max` bytes and ends on a char boundary.
fn fit(s: &str, max: usize) -> usize {
    s.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max)
        .last()
        .unwrap_or(0)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display endpoints
    pub displays: DisplayConfig,
    /// Observation API
    pub api: ApiConfig,
    /// Loop timing and active hours
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Set display configuration
    pub fn with_displays(mut self, displays: DisplayConfig) -> Self {
        self.displays = displays;
        self
    }

    /// Set API configuration
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// Set schedule configuration
    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Parses a JSON document. Missing fields keep their defaults.
    ///
    /// ```rust
    /// use vfd_weather::Config;
    ///
    /// let config = Config::from_json(r#"{"schedule":{"update_interval_secs":60}}"#).unwrap();
    /// assert_eq!(config.schedule.update_interval_secs, 60);
    /// assert_eq!(config.displays.baud_rate, 9600);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Overlays values from `lookup` (an environment-like source).
    ///
    /// Unset or empty variables leave the current value alone. Text values
    /// longer than [`MAX_SHORT_STRING`] bytes are rejected, not truncated.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_TOP) {
            self.displays.top = env_string(ENV_TOP, &v)?;
        }
        if let Some(v) = get(ENV_MIDDLE) {
            self.displays.middle = env_string(ENV_MIDDLE, &v)?;
        }
        if let Some(v) = get(ENV_BOTTOM) {
            self.displays.bottom = env_string(ENV_BOTTOM, &v)?;
        }
        if let Some(v) = get(ENV_BAUD) {
            self.displays.baud_rate = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_BAUD,
                value: v.clone(),
            })?;
        }
        if let Some(v) = get(ENV_STATION_ID) {
            self.api.station_id = env_string(ENV_STATION_ID, &v)?;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api.api_key = env_string(ENV_API_KEY, &v)?;
        }
        Ok(self)
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Serial endpoints of the three displays
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Top display (temperature)
    pub top: ShortString,
    /// Middle display (wind and humidity)
    pub middle: ShortString,
    /// Bottom display (last update)
    pub bottom: ShortString,
    /// Serial baud rate shared by all displays
    pub baud_rate: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top: short_string("/dev/ttyS5"),
            middle: short_string("/dev/ttyS7"),
            bottom: short_string("/dev/ttyS6"),
            baud_rate: 9600,
        }
    }
}

impl DisplayConfig {
    /// Set the top display endpoint
    pub fn with_top(mut self, endpoint: &str) -> Self {
        self.top = short_string(endpoint);
        self
    }

    /// Set the middle display endpoint
    pub fn with_middle(mut self, endpoint: &str) -> Self {
        self.middle = short_string(endpoint);
        self
    }

    /// Set the bottom display endpoint
    pub fn with_bottom(mut self, endpoint: &str) -> Self {
        self.bottom = short_string(endpoint);
        self
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }
}

// ============================================================================
// API Config
// ============================================================================

/// Observation API configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Endpoint without query string
    pub base_url: LongString,
    /// Personal weather station id
    pub station_id: ShortString,
    /// API key
    pub api_key: ShortString,
    /// Per-attempt request timeout in milliseconds
    pub timeout_ms: u32,
    /// Pause between failed attempts in milliseconds
    pub retry_backoff_ms: u32,
    /// Attempts per fetch (inclusive)
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: long_string("https://api.weather.com/v2/pws/observations/current"),
            station_id: ShortString::new(),
            api_key: ShortString::new(),
            timeout_ms: 3000,
            retry_backoff_ms: 2000,
            max_retries: 30,
        }
    }
}

impl ApiConfig {
    /// Set the base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = long_string(url);
        self
    }

    /// Set the station id
    pub fn with_station(mut self, station_id: &str) -> Self {
        self.station_id = short_string(station_id);
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = short_string(key);
        self
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the retry backoff
    pub fn with_retry_backoff_ms(mut self, ms: u32) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Set the attempt cap
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Full request URL (imperial units, JSON).
    pub fn url(&self) -> String {
        format!(
            "{}?stationId={}&format=json&units=e&apiKey={}",
            self.base_url, self.station_id, self.api_key
        )
    }

    /// Check if station and key are set
    pub fn is_configured(&self) -> bool {
        !self.station_id.is_empty() && !self.api_key.is_empty()
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }

    /// Retry backoff as a `Duration`
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(u64::from(self.retry_backoff_ms))
    }
}

// ============================================================================
// Schedule Config
// ============================================================================

/// Loop timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First active hour (inclusive)
    pub active_start_hour: u32,
    /// End of the active window (exclusive)
    pub active_end_hour: u32,
    /// Pause between ticks in seconds
    pub update_interval_secs: u32,
    /// Pause between reset and clear during display init, in milliseconds
    pub init_settle_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            active_start_hour: 6,
            active_end_hour: 23,
            update_interval_secs: 300,
            init_settle_ms: 1000,
        }
    }
}

impl ScheduleConfig {
    /// Set the active window `[start, end)`
    pub fn with_active_hours(mut self, start: u32, end: u32) -> Self {
        self.active_start_hour = start;
        self.active_end_hour = end;
        self
    }

    /// Set the tick interval
    pub fn with_update_interval_secs(mut self, secs: u32) -> Self {
        self.update_interval_secs = secs;
        self
    }

    /// Set the init settle delay
    pub fn with_init_settle_ms(mut self, ms: u32) -> Self {
        self.init_settle_ms = ms;
        self
    }

    /// Tick interval as a `Duration`
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.update_interval_secs))
    }

    /// Init settle delay as a `Duration`
    pub fn init_settle(&self) -> Duration {
        Duration::from_millis(u64::from(self.init_settle_ms))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.displays.top.as_str(), "/dev/ttyS5");
        assert_eq!(config.displays.middle.as_str(), "/dev/ttyS7");
        assert_eq!(config.displays.bottom.as_str(), "/dev/ttyS6");
        assert_eq!(config.displays.baud_rate, 9600);
        assert_eq!(config.api.max_retries, 30);
        assert_eq!(config.api.timeout(), Duration::from_secs(3));
        assert_eq!(config.api.retry_backoff(), Duration::from_secs(2));
        assert_eq!(config.schedule.update_interval(), Duration::from_secs(300));
        assert_eq!(config.schedule.init_settle(), Duration::from_secs(1));
        assert_eq!(config.schedule.active_start_hour, 6);
        assert_eq!(config.schedule.active_end_hour, 23);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_displays(
                DisplayConfig::default()
                    .with_top("/dev/ttyUSB0")
                    .with_middle("/dev/ttyUSB1")
                    .with_bottom("/dev/ttyUSB2")
                    .with_baud_rate(19200),
            )
            .with_schedule(
                ScheduleConfig::default()
                    .with_active_hours(7, 22)
                    .with_update_interval_secs(60)
                    .with_init_settle_ms(10),
            );

        assert_eq!(config.displays.top.as_str(), "/dev/ttyUSB0");
        assert_eq!(config.displays.middle.as_str(), "/dev/ttyUSB1");
        assert_eq!(config.displays.bottom.as_str(), "/dev/ttyUSB2");
        assert_eq!(config.displays.baud_rate, 19200);
        assert_eq!(config.schedule.active_start_hour, 7);
        assert_eq!(config.schedule.update_interval(), Duration::from_secs(60));
        assert_eq!(config.schedule.init_settle(), Duration::from_millis(10));
    }

    // =========================================================================
    // ApiConfig Tests
    // =========================================================================

    #[test]
    fn api_url() {
        let api = ApiConfig::default()
            .with_station("KTEST123")
            .with_api_key("k3y");
        assert_eq!(
            api.url(),
            "https://api.weather.com/v2/pws/observations/current?stationId=KTEST123&format=json&units=e&apiKey=k3y"
        );
    }

    #[test]
    fn api_is_configured() {
        assert!(!ApiConfig::default().is_configured());
        assert!(!ApiConfig::default().with_station("K1").is_configured());
        assert!(ApiConfig::default()
            .with_station("K1")
            .with_api_key("x")
            .is_configured());
    }

    // =========================================================================
    // Environment / JSON Tests
    // =========================================================================

    #[test]
    fn env_overrides() {
        let config = Config::default()
            .with_overrides(env(&[
                (ENV_TOP, "/dev/ttyA"),
                (ENV_BAUD, " 19200 "),
                (ENV_STATION_ID, "KSTATION"),
                (ENV_API_KEY, "secret"),
                (ENV_MIDDLE, ""),
            ]))
            .unwrap();

        assert_eq!(config.displays.top.as_str(), "/dev/ttyA");
        assert_eq!(config.displays.middle.as_str(), "/dev/ttyS7");
        assert_eq!(config.displays.baud_rate, 19200);
        assert_eq!(config.api.station_id.as_str(), "KSTATION");
        assert_eq!(config.api.api_key.as_str(), "secret");
    }

    #[test]
    fn env_bad_baud() {
        let err = Config::default()
            .with_overrides(env(&[(ENV_BAUD, "fast")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: ENV_BAUD,
                value: "fast".into()
            }
        );
    }

    #[test]
    fn env_overlong_endpoint_rejected() {
        let by_id = "/dev/serial/by-id/usb-Prolific_Technology_Inc._USB-Serial_Controller_D-if00-port0";
        assert!(by_id.len() > MAX_SHORT_STRING);

        let err = Config::default()
            .with_overrides(env(&[(ENV_TOP, by_id)]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: ENV_TOP,
                value: by_id.into()
            }
        );
    }

    #[test]
    fn env_overlong_api_key_rejected() {
        let key = "k".repeat(MAX_SHORT_STRING + 1);
        let err = Config::default()
            .with_overrides(env(&[(ENV_API_KEY, key.as_str())]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_API_KEY, .. }));
    }

    #[test]
    fn env_value_at_limit_accepted() {
        let path = format!("/dev/{}", "x".repeat(MAX_SHORT_STRING - 5));
        let config = Config::default()
            .with_overrides(env(&[(ENV_BOTTOM, path.as_str())]))
            .unwrap();
        assert_eq!(config.displays.bottom.as_str(), path);
    }

    #[test]
    fn from_env_reads_process_environment() {
        // Only checks the unset-variable path so parallel tests cannot interfere.
        if [ENV_TOP, ENV_MIDDLE, ENV_BOTTOM, ENV_BAUD, ENV_STATION_ID, ENV_API_KEY]
            .iter()
            .all(|var| std::env::var(var).is_err())
        {
            assert_eq!(Config::from_env().unwrap(), Config::default());
        }
    }

    #[test]
    fn json_partial_document() {
        let config = Config::from_json(
            r#"{"displays":{"top":"/dev/ttyUSB0"},"api":{"station_id":"K1","api_key":"x"}}"#,
        )
        .unwrap();
        assert_eq!(config.displays.top.as_str(), "/dev/ttyUSB0");
        assert_eq!(config.displays.bottom.as_str(), "/dev/ttyS6");
        assert!(config.api.is_configured());
        assert_eq!(config.api.max_retries, 30);
    }

    #[test]
    fn json_invalid_document() {
        assert!(matches!(
            Config::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn json_round_trip_of_defaults() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), Config::default());
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let s = short_string(&"a".repeat(100));
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn long_string_truncation() {
        let s = long_string(&"b".repeat(200));
        assert_eq!(s.len(), MAX_LONG_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // 17 four-byte chars = 68 bytes, only 16 fit
        let s = short_string(&"\u{1F682}".repeat(17));
        assert_eq!(s.len(), 64);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());

        let s = short_string(&format!("{}\u{e9}", "a".repeat(63)));
        assert_eq!(s.len(), 63);
    }
}
