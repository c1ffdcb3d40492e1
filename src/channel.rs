//! One display and the transport that feeds it.
//!
//! A [`DisplayChannel`] owns its transport exclusively and turns the
//! protocol [`Command`]s plus raw text into writes, strictly in the order
//! they are issued.
//!
//! # Lifecycle
//!
//! ```text
//!   open ──> Unopened ──initialize()──> Initialized <──text── Blank
//!                                            └──blank_full()──┘
//! ```
//!
//! A channel only becomes [`Initialized`](ChannelState::Initialized) once
//! the complete init sequence (reset, settle, clear, disable screensaver,
//! blank) has been written without error.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use vfd_weather::{ChannelState, DisplayChannel};
//! use vfd_weather::hal::{MockDelay, MockOpener};
//! use vfd_weather::traits::TransportOpener;
//!
//! let mut opener = MockOpener::new();
//! let port = opener.open("/dev/ttyS5").unwrap();
//! let mut channel = DisplayChannel::new("/dev/ttyS5", port);
//!
//! channel.initialize(&mut MockDelay::new(), Duration::from_secs(1)).unwrap();
//! assert_eq!(channel.state(), ChannelState::Initialized);
//!
//! channel.cursor_to_bottom_row().unwrap();
//! channel.write_text("Hello").unwrap();
//! ```

use crate::error::DisplayError;
use crate::protocol::{Command, ScreensaverMode, BOTTOM_ROW, DISPLAY_WIDTH, ROW_WIDTH, TOP_ROW};
use crate::traits::{Delay, Transport};
use core::time::Duration;
use tracing::{debug, trace};

/// Where a channel is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Transport is open but the init sequence has not completed.
    #[default]
    Unopened,
    /// Init sequence done; the display may show content.
    Initialized,
    /// Last thing written was a full-width blank.
    Blank,
}

/// A single display.
pub struct DisplayChannel<T: Transport> {
    endpoint: String,
    transport: T,
    state: ChannelState,
}

impl<T: Transport> DisplayChannel<T> {
    /// Wraps an already opened transport.
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            state: ChannelState::Unopened,
        }
    }

    /// Endpoint identifier this channel was opened on.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Returns true once the init sequence has completed.
    pub fn is_initialized(&self) -> bool {
        self.state != ChannelState::Unopened
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs the init sequence: reset, settle, clear, disable screensaver, blank.
    ///
    /// Any write failure aborts the sequence and leaves the channel
    /// [`Unopened`](ChannelState::Unopened). Nothing is retried here.
    pub fn initialize<D: Delay + ?Sized>(
        &mut self,
        delay: &mut D,
        settle: Duration,
    ) -> Result<(), DisplayError> {
        self.state = ChannelState::Unopened;

        self.reset()?;
        delay.delay(settle);
        self.clear()?;
        self.disable_screensaver()?;
        self.blank_full()?;

        self.state = ChannelState::Initialized;
        debug!(endpoint = %self.endpoint, "display initialized");
        Ok(())
    }

    /// Sends one command. Out-of-range parameters send nothing.
    pub fn command(&mut self, command: Command) -> Result<(), DisplayError> {
        match command.encode() {
            Some(frame) => self.write_bytes(&frame),
            None => {
                trace!(endpoint = %self.endpoint, ?command, "parameter out of range, not sent");
                Ok(())
            }
        }
    }

    /// Writes text verbatim at the current cursor position.
    ///
    /// No terminator is appended and nothing is truncated; keeping within the
    /// 20 character row is up to the caller.
    pub fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.write_bytes(text.as_bytes())?;
        if self.state == ChannelState::Blank && !text.trim().is_empty() {
            self.state = ChannelState::Initialized;
        }
        Ok(())
    }

    /// Resets the controller.
    pub fn reset(&mut self) -> Result<(), DisplayError> {
        self.command(Command::Reset)
    }

    /// Clears the screen.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(Command::Clear)
    }

    /// Writes 40 spaces, wiping both rows along with any blink attributes.
    pub fn blank_full(&mut self) -> Result<(), DisplayError> {
        self.write_bytes(&[b' '; DISPLAY_WIDTH])?;
        if self.state != ChannelState::Unopened {
            self.state = ChannelState::Blank;
        }
        Ok(())
    }

    /// Writes 20 spaces. Position the cursor at a row start first.
    pub fn blank_row(&mut self) -> Result<(), DisplayError> {
        self.write_bytes(&[b' '; ROW_WIDTH])
    }

    /// Moves the cursor to an absolute offset (`0..=0x27`); larger values send nothing.
    pub fn cursor_to(&mut self, position: u8) -> Result<(), DisplayError> {
        self.command(Command::CursorTo(position))
    }

    /// Moves the cursor to the start of the top row.
    ///
    /// The controller sometimes ignores the first positioning command after
    /// a state change, so the frame is always sent twice.
    pub fn cursor_to_top_row(&mut self) -> Result<(), DisplayError> {
        self.cursor_to(TOP_ROW)?;
        self.cursor_to(TOP_ROW)
    }

    /// Moves the cursor to the start of the bottom row (sent twice, see
    /// [`cursor_to_top_row`](Self::cursor_to_top_row)).
    pub fn cursor_to_bottom_row(&mut self) -> Result<(), DisplayError> {
        self.cursor_to(BOTTOM_ROW)?;
        self.cursor_to(BOTTOM_ROW)
    }

    /// Turns blinking on or off for the characters written next.
    ///
    /// Existing characters are not affected: to make one blink, position the
    /// cursor on it, enable blinking and write the character again.
    pub fn char_blink(&mut self, on: bool) -> Result<(), DisplayError> {
        self.command(Command::CharBlink(on))
    }

    /// Sets brightness `1..=5`; anything else is ignored.
    pub fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.command(Command::Brightness(level))
    }

    /// Arms the screensaver (it kicks in after the controller's idle time).
    pub fn enable_screensaver(&mut self, mode: ScreensaverMode) -> Result<(), DisplayError> {
        self.command(Command::Screensaver(mode))
    }

    /// Starts the screensaver right away.
    pub fn start_screensaver(&mut self) -> Result<(), DisplayError> {
        self.command(Command::StartScreensaver)
    }

    /// Disables the screensaver.
    pub fn disable_screensaver(&mut self) -> Result<(), DisplayError> {
        self.command(Command::DisableScreensaver)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.transport
            .write_all(bytes)
            .map_err(|e| DisplayError::TransportWrite {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })
    }
}

impl<T: Transport> core::fmt::Debug for DisplayChannel<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayChannel")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockDelay, MockTransport};

    fn channel() -> DisplayChannel<MockTransport> {
        DisplayChannel::new("/dev/ttyS5", MockTransport::new())
    }

    // =========================================================================
    // Init sequence
    // =========================================================================

    #[test]
    fn initialize_sequence() {
        let mut ch = channel();
        let mut delay = MockDelay::new();
        ch.initialize(&mut delay, Duration::from_secs(1)).unwrap();

        let writes = ch.transport().writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0], vec![0x1B, 0x05]);
        assert_eq!(writes[1], vec![0x1B, 0x02]);
        assert_eq!(writes[2], vec![0x1B, 0x0C]);
        assert_eq!(writes[3], vec![b' '; 40]);

        assert_eq!(delay.delays, vec![Duration::from_secs(1)]);
        assert_eq!(ch.state(), ChannelState::Initialized);
    }

    #[test]
    fn initialize_failure_leaves_unopened() {
        let transport = MockTransport::new();
        transport.fail_after(2);
        let mut ch = DisplayChannel::new("/dev/ttyS5", transport);

        let err = ch
            .initialize(&mut MockDelay::new(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, DisplayError::TransportWrite { .. }));
        assert_eq!(err.endpoint(), "/dev/ttyS5");
        assert_eq!(ch.state(), ChannelState::Unopened);
        assert!(!ch.is_initialized());
    }

    #[test]
    fn new_channel_is_unopened() {
        let ch = channel();
        assert_eq!(ch.state(), ChannelState::Unopened);
        assert!(ch.transport().written().is_empty());
    }

    // =========================================================================
    // Cursor quirk
    // =========================================================================

    #[test]
    fn top_row_sent_twice() {
        let mut ch = channel();
        ch.cursor_to_top_row().unwrap();
        assert_eq!(
            ch.transport().writes(),
            vec![vec![0x1B, 0x13, 0x00], vec![0x1B, 0x13, 0x00]]
        );
    }

    #[test]
    fn bottom_row_sent_twice() {
        let mut ch = channel();
        ch.cursor_to_bottom_row().unwrap();
        assert_eq!(
            ch.transport().writes(),
            vec![vec![0x1B, 0x13, 0x14], vec![0x1B, 0x13, 0x14]]
        );
    }

    #[test]
    fn cursor_out_of_range_sends_nothing() {
        let mut ch = channel();
        ch.cursor_to(0x28).unwrap();
        assert!(ch.transport().writes().is_empty());
    }

    // =========================================================================
    // Other commands
    // =========================================================================

    #[test]
    fn brightness_in_and_out_of_range() {
        let mut ch = channel();
        ch.set_brightness(0).unwrap();
        ch.set_brightness(6).unwrap();
        assert!(ch.transport().writes().is_empty());

        ch.set_brightness(3).unwrap();
        assert_eq!(ch.transport().writes(), vec![vec![0x1B, 0x17, 0x03]]);
    }

    #[test]
    fn blink_and_screensaver_frames() {
        let mut ch = channel();
        ch.char_blink(true).unwrap();
        ch.char_blink(false).unwrap();
        ch.enable_screensaver(ScreensaverMode::Blank).unwrap();
        ch.enable_screensaver(ScreensaverMode::Walk).unwrap();
        ch.start_screensaver().unwrap();
        ch.disable_screensaver().unwrap();

        assert_eq!(
            ch.transport().written(),
            vec![0x1B, 0x0D, 0x1B, 0x0E, 0x1B, 0x09, 0x1B, 0x0A, 0x1B, 0x0B, 0x1B, 0x0C]
        );
    }

    #[test]
    fn blank_row_is_twenty_spaces() {
        let mut ch = channel();
        ch.blank_row().unwrap();
        assert_eq!(ch.transport().written(), vec![b' '; 20]);
    }

    #[test]
    fn text_is_verbatim() {
        let mut ch = channel();
        ch.write_text("Running...").unwrap();
        assert_eq!(ch.transport().written(), b"Running...".to_vec());
    }

    // =========================================================================
    // State tracking
    // =========================================================================

    #[test]
    fn blank_and_text_toggle_state() {
        let mut ch = channel();
        ch.initialize(&mut MockDelay::new(), Duration::ZERO).unwrap();

        ch.blank_full().unwrap();
        assert_eq!(ch.state(), ChannelState::Blank);

        ch.write_text("    ").unwrap();
        assert_eq!(ch.state(), ChannelState::Blank);

        ch.write_text("Temperature: 20.0 C").unwrap();
        assert_eq!(ch.state(), ChannelState::Initialized);
    }

    #[test]
    fn blank_before_init_stays_unopened() {
        let mut ch = channel();
        ch.blank_full().unwrap();
        assert_eq!(ch.state(), ChannelState::Unopened);
    }
}
