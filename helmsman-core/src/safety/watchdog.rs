//! Link watchdog
//!
//! The host must keep talking. When no accepted line has arrived for
//! longer than the timeout, the watchdog zeroes the commanded speed and
//! latches; the controller stops the motor on the trip. Only the next
//! accepted line clears the latch.
//!
//! The check must run with a timestamp taken *after* the pending input
//! was processed. A timestamp from before would be older than the
//! liveness time just recorded, and the wrapping subtraction would read
//! as an enormous silence.

use crate::state::ControllerState;

/// Outcome of a watchdog check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogCheck {
    /// Host traffic is recent enough
    Alive,
    /// Timeout just expired; the motor must be stopped
    Tripped,
    /// Already tripped, still no traffic
    Latched,
}

/// Host link liveness check
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    timeout_ms: u32,
}

impl Watchdog {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Record an accepted line
    pub fn feed(&self, state: &mut ControllerState, now_ms: u32) {
        state.register_liveness(now_ms);
    }

    /// Evaluate the link and latch a trip
    pub fn check(&self, state: &mut ControllerState, now_ms: u32) -> WatchdogCheck {
        if state.watchdog_tripped {
            return WatchdogCheck::Latched;
        }

        if now_ms.wrapping_sub(state.last_command_ms) > self.timeout_ms {
            state.watchdog_tripped = true;
            state.commanded_speed = 0;
            WatchdogCheck::Tripped
        } else {
            WatchdogCheck::Alive
        }
    }
}
