//! Hardware configuration types
//!
//! Pin and channel roles for the drive board. The firmware's board file
//! fills these in; validation catches two roles wired to one pin.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ConfigError;

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Same pin with the inversion flag set as given
    pub const fn with_inversion(self, inverted: bool) -> Self {
        Self { inverted, ..self }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// Pin roles on the drive board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardPins {
    /// Motor driver enable input, driven with PWM
    pub motor_pwm: PinConfig,
    /// Motor driver phase (direction) input
    pub motor_dir: PinConfig,
    /// Encoder channel A
    pub encoder_a: PinConfig,
    /// Encoder channel B
    pub encoder_b: PinConfig,
    /// Steering servo signal
    pub servo: PinConfig,
    /// Host link UART TX
    pub host_tx: PinConfig,
    /// Host link UART RX
    pub host_rx: PinConfig,
    /// Diagnostics UART TX
    pub diag_tx: PinConfig,
}

impl BoardPins {
    const fn all(&self) -> [PinConfig; 8] {
        [
            self.motor_pwm,
            self.motor_dir,
            self.encoder_a,
            self.encoder_b,
            self.servo,
            self.host_tx,
            self.host_rx,
            self.diag_tx,
        ]
    }

    /// Check every role has an existing, unshared pin
    ///
    /// Usable in const context so a board file can be checked at compile time.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.all();
        let mut i = 0;
        while i < pins.len() {
            let pin = pins[i].pin;
            if pin > MAX_GPIO {
                return Err(ConfigError::InvalidPin(pin));
            }
            let mut j = i + 1;
            while j < pins.len() {
                if pins[j].pin == pin {
                    return Err(ConfigError::PinConflict(pin));
                }
                j += 1;
            }
            i += 1;
        }
        Ok(())
    }
}
