//! Controller context
//!
//! The single mutable record of what the host last asked for. Only the
//! main loop touches it: the interpreter and the watchdog write it, the
//! status reporter reads a [`Snapshot`] taken between operations.
//!
//! The driven direction is not stored here; the motor actuator owns it
//! so it cannot drift from what the output stage was last told.

use crate::config::STEER_CENTER;

use super::machine::Direction;

/// Commanded values and link timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    /// Last applied speed (-100..=100)
    pub commanded_speed: i8,
    /// Last applied steering angle (0..=180)
    pub commanded_steer: u8,
    /// Watchdog has stopped the motor and no line has arrived since
    pub watchdog_tripped: bool,
    /// Time the last accepted line arrived (ms)
    pub last_command_ms: u32,
}

impl ControllerState {
    /// Power-on state: stopped, steering centered
    pub fn new(now_ms: u32) -> Self {
        Self {
            commanded_speed: 0,
            commanded_steer: STEER_CENTER,
            watchdog_tripped: false,
            last_command_ms: now_ms,
        }
    }

    /// Record traffic from the host
    pub fn register_liveness(&mut self, now_ms: u32) {
        self.last_command_ms = now_ms;
        self.watchdog_tripped = false;
    }
}

/// Consistent view of the controller for telemetry and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Encoder tally
    pub encoder: i32,
    /// Commanded speed
    pub speed: i8,
    /// Commanded steering angle
    pub steer: u8,
    /// Direction currently driven
    pub direction: Direction,
    /// Watchdog latched
    pub watchdog_tripped: bool,
}
