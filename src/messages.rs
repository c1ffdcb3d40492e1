//! Wire types of the observation API body.
//!
//! Only the handful of fields the displays show are modelled; everything
//! else in the body is ignored.
//!
//! # Example
//!
//! ```
//! use vfd_weather::messages::ObservationResponse;
//!
//! let json = r#"{"observations":[{"humidity":65,"imperial":{"temp":50,"windSpeed":5,"windChill":45,"heatIndex":50}}]}"#;
//! let resp: ObservationResponse = serde_json::from_str(json).unwrap();
//! assert_eq!(resp.observations[0].imperial.temp, Some(50.0));
//! ```

use serde::{Deserialize, Serialize};

/// Top level of the `observations/current` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationResponse {
    /// Observation records, newest first. Only the first is used.
    #[serde(default)]
    pub observations: Vec<ObservationRecord>,
}

/// One station observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Relative humidity, percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Values in imperial units (`units=e`).
    #[serde(default)]
    pub imperial: ImperialUnits,
}

/// The imperial block of a record.
///
/// Stations without the relevant sensors report `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImperialUnits {
    /// Air temperature, °F.
    #[serde(default)]
    pub temp: Option<f64>,
    /// Wind speed, mph.
    #[serde(default)]
    pub wind_speed: Option<f64>,
    /// Wind chill, °F.
    #[serde(default)]
    pub wind_chill: Option<f64>,
    /// Heat index, °F.
    #[serde(default)]
    pub heat_index: Option<f64>,
}
