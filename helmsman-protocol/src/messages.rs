//! Message types for the host link
//!
//! Host → controller:
//! - `C:<speed>,<steer>` drive setpoint
//! - `E` emergency stop
//! - `R` reset the encoder tally
//!
//! Controller → host:
//! - `S:<encoder>,<speed>,<steer>` periodic status
//! - `E:<code>` fault notification
//!
//! Diagnostics (`[ERR] ...`) go out on a separate channel and are not part
//! of the control protocol.

use core::fmt::{self, Write};

use heapless::String;

/// Prefix of a drive command
pub const DRIVE_PREFIX: &[u8] = b"C:";

/// Longest outbound line, terminator included
pub const MAX_OUTBOUND_LEN: usize = 288;

/// An outbound line ready to be written to a UART
pub type OutboundLine = String<MAX_OUTBOUND_LEN>;

/// Errors produced while interpreting an inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// The line does not start with a known command
    UnknownCommand,
    /// `C:` body did not hold two integers
    BadDriveCommand,
}

/// Errors produced while rendering an outbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Line did not fit its buffer
    LineTooLong,
}

/// Parsed host command
///
/// `Malformed` is a recognised `C:` line whose body failed to parse. It
/// still counts as traffic from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Drive setpoint, values as sent (not yet clamped)
    Drive { speed: i32, steer: i32 },
    /// Stop the motor and center the steering
    EmergencyStop,
    /// Zero the encoder tally
    ResetEncoder,
    /// `C:` line with an unparsable body
    Malformed { raw: &'a [u8] },
}

impl<'a> Command<'a> {
    /// Classify a complete line (terminator already stripped)
    ///
    /// Returns `Err(ProtocolError::UnknownCommand)` for anything that is not
    /// one of the three commands.
    pub fn parse(line: &'a [u8]) -> Result<Self, ProtocolError> {
        match line {
            b"E" => Ok(Command::EmergencyStop),
            b"R" => Ok(Command::ResetEncoder),
            _ => match line.strip_prefix(DRIVE_PREFIX) {
                Some(body) => Ok(parse_drive(body).unwrap_or(Command::Malformed { raw: line })),
                None => Err(ProtocolError::UnknownCommand),
            },
        }
    }
}

/// Parse `<int>,<int>`
///
/// Each number may be preceded by whitespace. The comma must follow the
/// first number directly; whatever follows the second number is ignored.
fn parse_drive<'a>(body: &[u8]) -> Option<Command<'a>> {
    let (speed, rest) = scan_int(body)?;
    let rest = rest.strip_prefix(b",")?;
    let (steer, _) = scan_int(rest)?;
    Some(Command::Drive { speed, steer })
}

/// Leading whitespace, optional sign, then at least one digit
fn scan_int(input: &[u8]) -> Option<(i32, &[u8])> {
    let start = input
        .iter()
        .position(|&b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))?;
    let mut rest = &input[start..];

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    let mut value: i32 = 0;
    for &digit in &rest[..digits] {
        let digit = (digit - b'0') as i32;
        value = value.checked_mul(10)?;
        value = if negative {
            value.checked_sub(digit)?
        } else {
            value.checked_add(digit)?
        };
    }
    Some((value, &rest[digits..]))
}

/// Display adapter that prints a raw line with non-printable bytes escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a>(pub &'a [u8]);

impl fmt::Display for RawLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                f.write_char(byte as char)?;
            } else {
                write!(f, "\\x{:02X}", byte)?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawLine<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        match core::str::from_utf8(self.0) {
            Ok(text) => defmt::write!(fmt, "{=str}", text),
            Err(_) => defmt::write!(fmt, "{=[u8]}", self.0),
        }
    }
}

/// Periodic status line: `S:<encoder>,<speed>,<steer>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    /// Encoder tally
    pub encoder: i32,
    /// Commanded speed (-100..=100)
    pub speed: i8,
    /// Commanded steering angle (0..=180)
    pub steer: u8,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S:{},{},{}", self.encoder, self.speed, self.steer)
    }
}

/// Fault codes reported to the host as `E:<code>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCode {
    /// Motor commanded but the encoder did not move
    Stall,
    /// No command within the watchdog timeout
    WatchdogTimeout,
}

impl FaultCode {
    /// Numeric code used on the wire
    pub fn code(self) -> u8 {
        match self {
            FaultCode::Stall => 1,
            FaultCode::WatchdogTimeout => 2,
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E:{}", self.code())
    }
}

/// Human-readable diagnostic for the debug channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic<'a> {
    /// `C:` line whose numbers could not be parsed
    BadDrive(RawLine<'a>),
    /// Line that matched no command
    Unknown(RawLine<'a>),
    /// Line discarded because it outgrew the buffer
    Overflow,
}

impl<'a> Diagnostic<'a> {
    /// Diagnostic for a rejected or malformed line
    pub fn for_error(error: ProtocolError, raw: &'a [u8]) -> Self {
        match error {
            ProtocolError::BadDriveCommand => Diagnostic::BadDrive(RawLine(raw)),
            ProtocolError::UnknownCommand => Diagnostic::Unknown(RawLine(raw)),
        }
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::BadDrive(raw) => write!(f, "[ERR] Bad C cmd: {}", raw),
            Diagnostic::Unknown(raw) => write!(f, "[ERR] Unknown cmd: {}", raw),
            Diagnostic::Overflow => f.write_str("[ERR] Line overflow"),
        }
    }
}

/// Render any message as a newline-terminated line
pub fn to_line<M: fmt::Display>(message: &M) -> Result<OutboundLine, EncodeError> {
    let mut line = OutboundLine::new();
    write!(line, "{}\n", message).map_err(|_| EncodeError::LineTooLong)?;
    Ok(line)
}
