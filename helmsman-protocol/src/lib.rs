//! Host link protocol for the Helmsman drive controller
//!
//! The host computer talks to the controller over a UART using plain
//! newline-terminated ASCII lines, so it can be driven from a terminal:
//!
//! ```text
//! host → controller    C:<speed>,<steer>   speed -100..100, steer 0..180
//!                      E                   emergency stop
//!                      R                   reset encoder tally
//!
//! controller → host    S:<enc>,<speed>,<steer>   every status interval
//!                      E:<code>                  fault notification
//! ```
//!
//! Out-of-range numbers are clamped by the controller, not rejected here.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{FramerEvent, Line, LineFramer, LINE_CAPACITY, MAX_LINE_LEN};
pub use messages::{
    to_line, Command, Diagnostic, EncodeError, FaultCode, OutboundLine, ProtocolError, RawLine,
    StatusReport,
};
