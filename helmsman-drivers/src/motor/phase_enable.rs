//! Phase/enable H-bridge motor driver
//!
//! Drivers such as the DRV8838 or MAX14870 take a PWM signal on EN for
//! speed and a plain logic level on PH for direction. This driver maps a
//! [`Direction`] and a duty onto those two pins:
//!
//! | Direction  | PH                     | EN          |
//! |------------|------------------------|-------------|
//! | `Forward`  | forward level          | duty %      |
//! | `Backward` | opposite level         | duty %      |
//! | `Stopped`  | low                    | fully off   |
//!
//! Which PH level means forward depends on how the motor leads are
//! wired; `phase_inverted` flips it without touching the rest of the
//! stack.
//!
//! # Usage
//!
//! ```ignore
//! let mut motor = PhaseEnableMotor::new(pwm_channel, phase_pin, false);
//! motor.drive(Direction::Forward, 60)?;
//! motor.stop()?;
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use helmsman_core::state::Direction;
use helmsman_core::traits::MotorDriver;

use crate::DriverError;

/// DC motor behind a phase/enable driver
pub struct PhaseEnableMotor<P, O> {
    enable: P,
    phase: O,
    phase_inverted: bool,
}

impl<P: SetDutyCycle, O: OutputPin> PhaseEnableMotor<P, O> {
    /// Wrap the enable PWM channel and the phase pin
    pub fn new(enable: P, phase: O, phase_inverted: bool) -> Self {
        Self {
            enable,
            phase,
            phase_inverted,
        }
    }

    /// Release the pins
    pub fn release(self) -> (P, O) {
        (self.enable, self.phase)
    }

    fn set_phase(&mut self, high: bool) -> Result<(), DriverError> {
        let result = if high {
            self.phase.set_high()
        } else {
            self.phase.set_low()
        };
        result.map_err(|_| DriverError::Pin)
    }
}

impl<P: SetDutyCycle, O: OutputPin> MotorDriver for PhaseEnableMotor<P, O> {
    type Error = DriverError;

    fn drive(&mut self, direction: Direction, duty_percent: u8) -> Result<(), Self::Error> {
        match direction {
            Direction::Stopped => {
                self.enable
                    .set_duty_cycle_fully_off()
                    .map_err(|_| DriverError::Pwm)?;
                self.set_phase(false)
            }
            Direction::Forward | Direction::Backward => {
                let forward = direction == Direction::Forward;
                self.set_phase(forward != self.phase_inverted)?;
                self.enable
                    .set_duty_cycle_percent(duty_percent.min(100))
                    .map_err(|_| DriverError::Pwm)
            }
        }
    }
}
