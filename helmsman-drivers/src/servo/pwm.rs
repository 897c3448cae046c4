//! Hobby servo on a PWM channel
//!
//! The servo expects one pulse per frame (20 ms at 50 Hz) whose width
//! sets the horn position. The angle range 0..=180 maps linearly onto
//! `min_pulse_us..=max_pulse_us`. The PWM channel must already run at the
//! frame rate; this driver only sets the duty as a fraction of the frame.

use embedded_hal::pwm::SetDutyCycle;
use helmsman_core::config::STEER_MAX;
use helmsman_core::traits::ServoDriver;

use crate::DriverError;

/// Pulse timing for a servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// Pulse width at 0° (µs)
    pub min_pulse_us: u16,
    /// Pulse width at 180° (µs)
    pub max_pulse_us: u16,
    /// Frame length (µs)
    pub period_us: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 500,
            max_pulse_us: 2500,
            period_us: 20_000,
        }
    }
}

impl ServoConfig {
    /// Pulse width for `degrees`, clamped to the servo travel
    pub fn pulse_us(&self, degrees: u8) -> u16 {
        let degrees = degrees.min(STEER_MAX) as u32;
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us) as u32;
        self.min_pulse_us + (span * degrees / STEER_MAX as u32) as u16
    }
}

/// Servo driven from one PWM output
pub struct PwmServo<P> {
    pwm: P,
    config: ServoConfig,
}

impl<P: SetDutyCycle> PwmServo<P> {
    pub fn new(pwm: P, config: ServoConfig) -> Self {
        Self { pwm, config }
    }

    /// Stop sending pulses; most servos go limp
    pub fn detach(&mut self) -> Result<(), DriverError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| DriverError::Pwm)
    }
}

impl<P: SetDutyCycle> ServoDriver for PwmServo<P> {
    type Error = DriverError;

    fn write_angle(&mut self, degrees: u8) -> Result<(), Self::Error> {
        let pulse = self.config.pulse_us(degrees);
        self.pwm
            .set_duty_cycle_fraction(pulse, self.config.period_us)
            .map_err(|_| DriverError::Pwm)
    }
}
