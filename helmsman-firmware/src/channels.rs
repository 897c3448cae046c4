//! State shared between tasks
//!
//! The encoder tally is written from the high-priority edge task and read
//! by the link task; diagnostics are queued to the diagnostics UART task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use helmsman_core::encoder::QuadratureDecoder;
use helmsman_protocol::OutboundLine;

/// Channel capacity for diagnostic lines
const DIAG_CHANNEL_SIZE: usize = 4;

/// Wheel encoder tally
pub static ENCODER: QuadratureDecoder = QuadratureDecoder::new();

/// Human-readable lines for the diagnostics UART
pub static DIAG_CHANNEL: Channel<CriticalSectionRawMutex, OutboundLine, DIAG_CHANNEL_SIZE> =
    Channel::new();
