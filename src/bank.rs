//! The three role-keyed displays.
//!
//! A [`DisplayBank`] opens one [`DisplayChannel`] per distinct endpoint and
//! routes the per-role content to it. Two roles configured with the same
//! endpoint share a single channel.
//!
//! Rendered layout (20 characters per row):
//!
//! ```text
//!   Top     Temperature: 21.7 C      Middle  Wind speed : 5 mph
//!           Feels Like : 19.4 C              Humidity   : 65 %
//!
//!   Bottom  (blank)
//!           Last Update : 14:05
//! ```

use crate::channel::DisplayChannel;
use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::traits::{Delay, ErrorObserver, TransportOpener};
use crate::weather::WeatherObservation;
use core::time::Duration;
use tracing::{debug, info};

/// Logical display position. Rendering follows declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayRole {
    /// Temperature and feels-like.
    Top,
    /// Wind speed and humidity.
    Middle,
    /// Time of the last update.
    Bottom,
}

impl DisplayRole {
    /// All roles in rendering order.
    pub const ALL: [DisplayRole; 3] = [DisplayRole::Top, DisplayRole::Middle, DisplayRole::Bottom];

    /// Configured endpoint for this role.
    pub fn endpoint(self, config: &DisplayConfig) -> &str {
        match self {
            DisplayRole::Top => config.top.as_str(),
            DisplayRole::Middle => config.middle.as_str(),
            DisplayRole::Bottom => config.bottom.as_str(),
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for DisplayRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DisplayRole::Top => "top",
            DisplayRole::Middle => "middle",
            DisplayRole::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Two text rows for one display. `None` leaves the row as blanked.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleLines {
    /// Top row text.
    pub top: Option<String>,
    /// Bottom row text.
    pub bottom: String,
}

/// Content of `role` for one observation.
///
/// Celsius values get one decimal; wind speed and humidity are printed as
/// the API reported them.
///
/// ```rust
/// use vfd_weather::bank::{role_lines, DisplayRole};
/// # use vfd_weather::WeatherObservation;
/// # let obs = WeatherObservation {
/// #     temperature_f: 71, wind_speed_mph: 5.0, wind_chill_f: 71.0,
/// #     heat_index_f: 71.0, humidity_pct: 65.0, observed_at: Default::default(),
/// # };
/// let lines = role_lines(DisplayRole::Middle, &obs, 19.4, 21.7, "14:05");
/// assert_eq!(lines.top.as_deref(), Some("Wind speed : 5 mph"));
/// assert_eq!(lines.bottom, "Humidity   : 65 %");
/// ```
pub fn role_lines(
    role: DisplayRole,
    observation: &WeatherObservation,
    feels_like_c: f64,
    temperature_c: f64,
    last_update: &str,
) -> RoleLines {
    match role {
        DisplayRole::Top => RoleLines {
            top: Some(format!("Temperature: {:.1} C", temperature_c)),
            bottom: format!("Feels Like : {:.1} C", feels_like_c),
        },
        DisplayRole::Middle => RoleLines {
            top: Some(format!("Wind speed : {} mph", observation.wind_speed_mph)),
            bottom: format!("Humidity   : {} %", observation.humidity_pct),
        },
        DisplayRole::Bottom => RoleLines {
            top: None,
            bottom: format!("Last Update : {}", last_update),
        },
    }
}

/// Failures of one `initialize_all` / `reinitialize` pass, per role.
pub type InitFailures = Vec<(DisplayRole, DisplayError)>;

/// Owns the display channels and routes per-role operations to them.
pub struct DisplayBank<O: TransportOpener> {
    opener: O,
    endpoints: [String; 3],
    settle: Duration,
    channels: Vec<DisplayChannel<O::Transport>>,
    roles: [Option<usize>; 3],
}

impl<O: TransportOpener> DisplayBank<O> {
    /// Creates an empty bank. Nothing is opened until
    /// [`initialize_all`](Self::initialize_all).
    pub fn new(opener: O, config: &DisplayConfig, settle: Duration) -> Self {
        Self {
            opener,
            endpoints: DisplayRole::ALL.map(|role| role.endpoint(config).to_string()),
            settle,
            channels: Vec::new(),
            roles: [None; 3],
        }
    }

    /// Opens and initializes every role's endpoint in role order.
    ///
    /// Endpoints already in the bank are not opened again; the role is mapped
    /// to the existing channel. A failing endpoint is reported to `observer`
    /// and returned, and the remaining roles are still attempted. A channel
    /// whose init sequence failed stays in the bank (uninitialized) so a later
    /// [`reinitialize`](Self::reinitialize) can retry it.
    pub fn initialize_all<D, E>(&mut self, delay: &mut D, observer: &mut E) -> InitFailures
    where
        D: Delay + ?Sized,
        E: ErrorObserver + ?Sized,
    {
        let mut failures = Vec::new();

        for role in DisplayRole::ALL {
            if self.roles[role.index()].is_some() {
                continue;
            }
            let endpoint = self.endpoints[role.index()].clone();

            if let Some(index) = self.channel_index(&endpoint) {
                debug!(%role, endpoint = %endpoint, "endpoint already open, sharing channel");
                self.roles[role.index()] = Some(index);
                continue;
            }

            let transport = match self.opener.open(&endpoint) {
                Ok(transport) => transport,
                Err(e) => {
                    let err = DisplayError::TransportOpen {
                        endpoint,
                        reason: e.to_string(),
                    };
                    observer.on_error(err.kind(), &format!("{} display: {}", role, err));
                    failures.push((role, err));
                    continue;
                }
            };

            let mut channel = DisplayChannel::new(endpoint.as_str(), transport);
            if let Err(err) = channel.initialize(delay, self.settle) {
                observer.on_error(err.kind(), &format!("{} display: {}", role, err));
                failures.push((role, err));
            } else {
                info!(%role, endpoint = %endpoint, "display ready");
            }

            self.channels.push(channel);
            self.roles[role.index()] = Some(self.channels.len() - 1);
        }

        failures
    }

    /// Re-runs the init sequence on every open channel, then retries roles
    /// whose endpoint never opened.
    pub fn reinitialize<D, E>(&mut self, delay: &mut D, observer: &mut E) -> InitFailures
    where
        D: Delay + ?Sized,
        E: ErrorObserver + ?Sized,
    {
        let mut failures = Vec::new();

        for index in 0..self.channels.len() {
            let role = self.first_role_of(index);
            if let Err(err) = self.channels[index].initialize(delay, self.settle) {
                observer.on_error(err.kind(), &format!("{} display: {}", role, err));
                failures.push((role, err));
            }
        }

        failures.extend(self.initialize_all(delay, observer));
        debug!(channels = self.channels.len(), failed = failures.len(), "bank reinitialized");
        failures
    }

    /// Writes one observation to every role.
    ///
    /// Per role: blank full, cursor to top row, line 1, cursor to bottom row,
    /// line 2. The bottom role's top row is left blank and its cursor is not
    /// moved there. A failing role does not stop the others; the first error
    /// is returned.
    pub fn render(
        &mut self,
        observation: &WeatherObservation,
        feels_like_c: f64,
        temperature_c: f64,
        last_update: &str,
    ) -> Result<(), DisplayError> {
        let mut first_error = None;

        for role in DisplayRole::ALL {
            let Some(index) = self.roles[role.index()] else {
                continue;
            };
            let lines = role_lines(role, observation, feels_like_c, temperature_c, last_update);
            if let Err(err) = render_lines(&mut self.channels[index], &lines) {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Writes a raw banner line without positioning the cursor.
    ///
    /// Goes to the bottom display, or to the last open channel if the bottom
    /// endpoint never opened. With no open channel this does nothing.
    pub fn show_message(&mut self, text: &str) -> Result<(), DisplayError> {
        let index = self.roles[DisplayRole::Bottom.index()]
            .or_else(|| self.channels.len().checked_sub(1));
        match index {
            Some(index) => self.channels[index].write_text(text),
            None => {
                debug!(text, "no display open, message dropped");
                Ok(())
            }
        }
    }

    /// Channel serving `role`, if its endpoint is open.
    pub fn channel(&self, role: DisplayRole) -> Option<&DisplayChannel<O::Transport>> {
        self.roles[role.index()].map(|i| &self.channels[i])
    }

    /// Mutable channel serving `role`.
    pub fn channel_mut(&mut self, role: DisplayRole) -> Option<&mut DisplayChannel<O::Transport>> {
        match self.roles[role.index()] {
            Some(i) => Some(&mut self.channels[i]),
            None => None,
        }
    }

    /// Number of distinct open channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Borrow the opener.
    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Drops every channel (closing its transport) and returns the opener.
    pub fn into_opener(self) -> O {
        self.opener
    }

    fn channel_index(&self, endpoint: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.endpoint() == endpoint)
    }

    fn first_role_of(&self, index: usize) -> DisplayRole {
        DisplayRole::ALL
            .into_iter()
            .find(|role| self.roles[role.index()] == Some(index))
            .unwrap_or(DisplayRole::Top)
    }
}

fn render_lines<T: crate::traits::Transport>(
    channel: &mut DisplayChannel<T>,
    lines: &RoleLines,
) -> Result<(), DisplayError> {
    channel.blank_full()?;
    if let Some(top) = &lines.top {
        channel.cursor_to_top_row()?;
        channel.write_text(top)?;
    }
    channel.cursor_to_bottom_row()?;
    channel.write_text(&lines.bottom)
}

impl<O: TransportOpener> core::fmt::Debug for DisplayBank<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayBank")
            .field("endpoints", &self.endpoints)
            .field("channels", &self.channels)
            .field("roles", &self.roles)
            .finish()
    }
}
