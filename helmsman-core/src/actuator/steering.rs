//! Steering actuator
//!
//! Clamps requested angles into the servo's travel and remembers the last
//! angle written.

use crate::config::{clamp_steer, STEER_CENTER};
use crate::traits::{ActuatorError, ServoDriver};

/// Angle control on top of a servo driver
pub struct SteeringActuator<S> {
    driver: S,
    angle: u8,
}

impl<S: ServoDriver> SteeringActuator<S> {
    /// Wrap a driver; assumes the servo sits at center until told otherwise
    pub fn new(driver: S) -> Self {
        Self {
            driver,
            angle: STEER_CENTER,
        }
    }

    /// Last angle written (degrees)
    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Move to `angle`, clamped to 0..=180; returns the angle applied
    pub fn set_angle(&mut self, angle: i32) -> Result<u8, ActuatorError> {
        let angle = clamp_steer(angle);
        self.driver
            .write_angle(angle)
            .map_err(|_| ActuatorError::Steering)?;
        self.angle = angle;
        Ok(angle)
    }

    /// Return to straight ahead
    pub fn center(&mut self) -> Result<(), ActuatorError> {
        self.set_angle(STEER_CENTER as i32).map(|_| ())
    }
}
