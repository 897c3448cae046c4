//! Line framing for the host command link.
//!
//! The host sends newline-terminated ASCII lines. Either `\n` or `\r`
//! terminates a line, so `\r\n` endings work and the empty line between
//! the two terminators is dropped.
//!
//! The line buffer has a fixed capacity. A line that outgrows it before a
//! terminator arrives is thrown away and accumulation restarts with the
//! next byte; the framer reports this as [`FramerEvent::Overflow`] so the
//! caller can tell it apart from a dispatched line.

use heapless::Vec;

/// Line buffer capacity, counting the terminator slot
pub const LINE_CAPACITY: usize = 64;

/// Longest line content the framer will yield
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// A complete line without its terminator
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Something the framer has to tell the caller about
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerEvent {
    /// A terminator closed a non-empty line
    Line(Line),
    /// The buffer filled before a terminator and was discarded
    Overflow,
}

/// Accumulates a byte stream into command lines
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    buffer: Vec<u8, MAX_LINE_LEN>,
}

impl LineFramer {
    /// Create an empty framer
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes buffered for the line in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Some(FramerEvent::Line)` when a terminator closes a
    /// non-empty line, `Some(FramerEvent::Overflow)` when the byte did not
    /// fit, and `None` otherwise. The byte that overflows the buffer is
    /// discarded along with the buffered content.
    pub fn push(&mut self, byte: u8) -> Option<FramerEvent> {
        match byte {
            b'\n' | b'\r' => {
                if self.buffer.is_empty() {
                    return None;
                }
                let line = self.buffer.clone();
                self.buffer.clear();
                Some(FramerEvent::Line(line))
            }
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    return Some(FramerEvent::Overflow);
                }
                None
            }
        }
    }
}
