//! Motor driver trait
//!
//! A DC motor behind a direction + PWM driver stage (H-bridge or
//! phase/enable). The driver only translates a direction and a duty into
//! pin states; reversal protection and duty limits sit above it in
//! [`crate::actuator::MotorActuator`].

use crate::state::Direction;

/// Which actuator refused an output change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Motor driver output failed
    Motor,
    /// Steering servo output failed
    Steering,
}

/// DC motor output stage
pub trait MotorDriver {
    /// Error type for output operations
    type Error;

    /// Drive the motor in `direction` at `duty_percent` (0-100)
    ///
    /// `Direction::Stopped` must turn the output fully off regardless of
    /// the duty passed.
    fn drive(&mut self, direction: Direction, duty_percent: u8) -> Result<(), Self::Error>;

    /// Turn the output off
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.drive(Direction::Stopped, 0)
    }
}
