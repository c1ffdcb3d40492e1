//! Wire format of the VFD controller.
//!
//! Every command is a short frame starting with the escape byte `0x1B`:
//!
//! ```text
//! simple:   [0x1B, opcode]
//! extended: [0x1B, opcode, param]   (opcode/param sent as one big-endian u16)
//! ```
//!
//! Text is not framed at all; it is written to the port verbatim and the
//! controller draws it at the current cursor position. See
//! [`DisplayChannel`](crate::DisplayChannel) for the operations built on top
//! of these frames.
//!
//! # Example
//!
//! ```rust
//! use vfd_weather::protocol::{Command, ESC};
//!
//! let frame = Command::CursorTo(0x14).encode().unwrap();
//! assert_eq!(frame.as_slice(), &[ESC, 0x13, 0x14]);
//!
//! // Brightness outside 1..=5 produces no frame at all
//! assert!(Command::Brightness(6).encode().is_none());
//! ```

use heapless::Vec as HVec;

/// Escape byte that prefixes every command frame.
pub const ESC: u8 = 0x1B;

/// Characters per row.
pub const ROW_WIDTH: usize = 20;

/// Characters on the whole display (two rows).
pub const DISPLAY_WIDTH: usize = 2 * ROW_WIDTH;

/// Cursor offset of the first character of the top row.
pub const TOP_ROW: u8 = 0x00;

/// Cursor offset of the first character of the bottom row.
pub const BOTTOM_ROW: u8 = 0x14;

/// Highest addressable cursor offset.
pub const MAX_CURSOR: u8 = 0x27;

/// Valid brightness levels.
pub const BRIGHTNESS_LEVELS: core::ops::RangeInclusive<u8> = 1..=5;

/// Controller opcodes.
pub mod opcode {
    /// Reset / initialize the controller.
    pub const RESET: u8 = 0x05;
    /// Clear the screen.
    pub const CLEAR: u8 = 0x02;
    /// Following characters blink.
    pub const CHAR_BLINK_ON: u8 = 0x0D;
    /// Following characters stop blinking.
    pub const CHAR_BLINK_OFF: u8 = 0x0E;
    /// Screensaver blanks the screen when it kicks in.
    pub const SCREENSAVER_BLANK: u8 = 0x09;
    /// Screensaver walks the content around when it kicks in.
    pub const SCREENSAVER_WALK: u8 = 0x0A;
    /// Start the screensaver now.
    pub const SCREENSAVER_START: u8 = 0x0B;
    /// Disable the screensaver.
    pub const SCREENSAVER_DISABLE: u8 = 0x0C;
    /// Extended: move the cursor to an absolute offset.
    pub const SET_CURSOR: u8 = 0x13;
    /// Extended: set the brightness level.
    pub const SET_BRIGHTNESS: u8 = 0x17;
}

/// One encoded command, at most three bytes.
pub type Frame = HVec<u8, 3>;

/// Encodes a two byte command: `[ESC, opcode]`.
pub fn simple_command(opcode: u8) -> Frame {
    let mut frame = Frame::new();
    let _ = frame.extend_from_slice(&[ESC, opcode]);
    frame
}

/// Encodes a three byte command: `[ESC, opcode, param]`.
///
/// The controller reads opcode and parameter as a single big-endian 16-bit
/// word following the escape byte.
pub fn extended_command(opcode: u8, param: u8) -> Frame {
    let word = (u16::from(opcode) << 8) | u16::from(param);
    let mut frame = Frame::new();
    let _ = frame.push(ESC);
    let _ = frame.extend_from_slice(&word.to_be_bytes());
    frame
}

/// What the screensaver does once it triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScreensaverMode {
    /// Blank the screen.
    #[default]
    Blank,
    /// Walk the content across the screen.
    Walk,
}

/// Abstract display command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reset the controller.
    Reset,
    /// Clear the screen.
    Clear,
    /// Turn character blinking on or off for subsequent writes.
    CharBlink(bool),
    /// Arm the screensaver in the given mode.
    Screensaver(ScreensaverMode),
    /// Start the screensaver immediately.
    StartScreensaver,
    /// Disable the screensaver.
    DisableScreensaver,
    /// Move the cursor to an absolute character offset (`0..=0x27`).
    CursorTo(u8),
    /// Set brightness (`1..=5`).
    Brightness(u8),
}

impl Command {
    /// Encodes the command, or `None` when its parameter is out of range.
    pub fn encode(&self) -> Option<Frame> {
        let frame = match *self {
            Command::Reset => simple_command(opcode::RESET),
            Command::Clear => simple_command(opcode::CLEAR),
            Command::CharBlink(true) => simple_command(opcode::CHAR_BLINK_ON),
            Command::CharBlink(false) => simple_command(opcode::CHAR_BLINK_OFF),
            Command::Screensaver(ScreensaverMode::Blank) => {
                simple_command(opcode::SCREENSAVER_BLANK)
            }
            Command::Screensaver(ScreensaverMode::Walk) => simple_command(opcode::SCREENSAVER_WALK),
            Command::StartScreensaver => simple_command(opcode::SCREENSAVER_START),
            Command::DisableScreensaver => simple_command(opcode::SCREENSAVER_DISABLE),
            Command::CursorTo(position) => {
                if position > MAX_CURSOR {
                    return None;
                }
                extended_command(opcode::SET_CURSOR, position)
            }
            Command::Brightness(level) => {
                if !BRIGHTNESS_LEVELS.contains(&level) {
                    return None;
                }
                extended_command(opcode::SET_BRIGHTNESS, level)
            }
        };
        Some(frame)
    }
}
